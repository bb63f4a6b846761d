//! Workflow-runner surface: step outputs and workflow commands.

use std::io::Write;
use std::path::Path;

/// Appends `name=value` to the step output file, or prints it when the
/// runner provides none.
pub fn set_output(output_file: Option<&Path>, name: &str, value: &str) -> std::io::Result<()> {
    match output_file {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}={}", name, value)
        }
        None => {
            println!("{}={}", name, value);
            Ok(())
        }
    }
}

/// `::error::<message>` with the message escaped so it stays on one line.
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// `::warning::<message>`.
pub fn warning_annotation(message: &str) -> String {
    format!("::warning::{}", escape_data(message))
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
