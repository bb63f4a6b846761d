#![allow(dead_code)]

use argosync::ActionInputs;

/// Fluent builder for [`ActionInputs`] with workable defaults.
pub struct InputsBuilder {
    inputs: ActionInputs,
}

impl InputsBuilder {
    pub fn new() -> Self {
        Self {
            inputs: ActionInputs {
                gitops_repository: Some("acme/gitops".to_string()),
                gitops_token: Some("test-token".to_string()),
                environment: Some("dev".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn repository(mut self, value: &str) -> Self {
        self.inputs.gitops_repository = Some(value.to_string());
        self
    }

    pub fn token(mut self, value: &str) -> Self {
        self.inputs.gitops_token = Some(value.to_string());
        self
    }

    pub fn environment(mut self, value: &str) -> Self {
        self.inputs.environment = Some(value.to_string());
        self
    }

    pub fn application_name(mut self, value: &str) -> Self {
        self.inputs.application_name = Some(value.to_string());
        self
    }

    pub fn branch(mut self, value: &str) -> Self {
        self.inputs.gitops_branch = Some(value.to_string());
        self
    }

    pub fn gitops_path(mut self, value: &str) -> Self {
        self.inputs.gitops_path = Some(value.to_string());
        self
    }

    pub fn manifests_path(mut self, value: &str) -> Self {
        self.inputs.application_manifests_path = Some(value.to_string());
        self
    }

    pub fn custom_values(mut self, value: &str) -> Self {
        self.inputs.custom_values = Some(value.to_string());
        self
    }

    pub fn chart(mut self, value: &str) -> Self {
        self.inputs.chart = Some(value.to_string());
        self
    }

    pub fn helm_path(mut self, value: &str) -> Self {
        self.inputs.helm_path = Some(value.to_string());
        self
    }

    pub fn build(self) -> ActionInputs {
        self.inputs
    }
}

impl Default for InputsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
