//! Removal request for a previously registered service.

use serde::{Deserialize, Serialize};

use crate::model::service::Mode;

/// Parameters for removing one service's configuration fragments.
///
/// Constructed per delete request and discarded after execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveSpec {
    pub service_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub acl_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub templates_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub configs_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consul_addresses: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mode: String,
}

impl RemoveSpec {
    pub fn parsed_mode(&self) -> Mode {
        Mode::parse(&self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_spec_mode_is_case_insensitive() {
        let spec = RemoveSpec {
            service_name: "myService".to_string(),
            mode: "SerVice".to_string(),
            ..RemoveSpec::default()
        };
        assert!(spec.parsed_mode().is_swarm());
    }
}
