//! Structural merge of YAML documents.

use serde_yaml::Value;

/// Merges `overlay` into `base`, returning the combined tree.
///
/// Two mappings merge key by key, recursively. In every other pairing
/// (scalar, sequence, tagged value, or a mapping meeting a non-mapping) the
/// overlay value replaces the base value outright, so sequences are never
/// concatenated. Keys only present in `base` are kept in place; keys only
/// present in `overlay` are appended in overlay order.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::replace(slot, Value::Null);
                        *slot = deep_merge(base_value, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}
