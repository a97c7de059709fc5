//! Query-string forms of the control requests.
//!
//! List-valued descriptor fields travel as comma-separated values in a
//! single parameter, so the query types keep them as raw strings and
//! split on conversion.

use serde::Deserialize;

use crate::model::{RemoveSpec, ServiceSpec, User};

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// `GET /v1/flow-proxy/reconfigure` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconfigureParams {
    pub service_name: String,
    pub service_color: String,
    pub service_domain: String,
    pub service_path: String,
    pub path_type: String,
    pub outbound_hostname: String,
    pub req_rep_search: String,
    pub req_rep_replace: String,
    pub template_fe_path: String,
    pub template_be_path: String,
    pub consul_template_fe_path: String,
    pub consul_template_be_path: String,
    pub users: String,
    pub acl_name: String,
    pub port: String,
    pub skip_check: bool,
    pub service_cert: String,
    pub distribute: bool,
}

impl ReconfigureParams {
    /// Convert to a descriptor. `default_mode` is the sidecar's own mode
    /// and applies to every request it serves.
    pub fn into_spec(self, default_mode: &str) -> ServiceSpec {
        ServiceSpec {
            service_name: self.service_name,
            service_color: self.service_color,
            service_domain: split_csv(&self.service_domain),
            service_path: split_csv(&self.service_path),
            path_type: self.path_type,
            outbound_hostname: self.outbound_hostname,
            req_rep_search: self.req_rep_search,
            req_rep_replace: self.req_rep_replace,
            template_fe_path: self.template_fe_path,
            template_be_path: self.template_be_path,
            consul_template_fe_path: self.consul_template_fe_path,
            consul_template_be_path: self.consul_template_be_path,
            users: User::parse_list(&self.users),
            acl_name: self.acl_name,
            port: self.port,
            skip_check: self.skip_check,
            mode: default_mode.to_string(),
            service_cert: self.service_cert,
            distribute: self.distribute,
        }
    }
}

/// `GET /v1/flow-proxy/remove` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveParams {
    pub service_name: String,
    pub acl_name: String,
    pub distribute: bool,
}

impl RemoveParams {
    pub fn into_spec(
        self,
        templates_path: &str,
        configs_path: &str,
        consul_addresses: &[String],
        instance_name: &str,
        mode: &str,
    ) -> RemoveSpec {
        RemoveSpec {
            service_name: self.service_name,
            acl_name: self.acl_name,
            templates_path: templates_path.to_string(),
            configs_path: configs_path.to_string(),
            consul_addresses: consul_addresses.to_vec(),
            instance_name: instance_name.to_string(),
            mode: mode.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_fields_are_split_and_trimmed() {
        let params = ReconfigureParams {
            service_name: "myService".to_string(),
            service_domain: "my-domain.com, other.com".to_string(),
            service_path: "/api,/admin".to_string(),
            users: "user1:pass1,user2:pass2".to_string(),
            ..ReconfigureParams::default()
        };
        let spec = params.into_spec("swarm");
        assert_eq!(spec.service_domain, ["my-domain.com", "other.com"]);
        assert_eq!(spec.service_path, ["/api", "/admin"]);
        assert_eq!(spec.users.len(), 2);
        assert_eq!(spec.mode, "swarm");
    }

    #[test]
    fn test_query_deserialization_uses_wire_names() {
        let params: ReconfigureParams = serde_urlencoded::from_str(
            "serviceName=myService&servicePath=/api&skipCheck=true&distribute=true",
        )
        .unwrap();
        assert_eq!(params.service_name, "myService");
        assert!(params.skip_check);
        assert!(params.distribute);
        assert!(params.port.is_empty());
    }
}
