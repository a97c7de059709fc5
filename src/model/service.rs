//! Per-service descriptor and the shared cluster configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating context for a reconfigure request.
///
/// `Service` and `Swarm` select orchestrator-aware backend resolution and
/// make the port mandatory; `Default` resolves backends statically from
/// the descriptor and the registry catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Default,
    Service,
    Swarm,
}

impl Mode {
    /// Parse a mode string. Matching is case-insensitive; anything that is
    /// not "service" or "swarm" falls back to the default mode.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("service") {
            Mode::Service
        } else if raw.eq_ignore_ascii_case("swarm") {
            Mode::Swarm
        } else {
            Mode::Default
        }
    }

    /// True for the orchestrator-aware modes (service/swarm).
    pub fn is_swarm(self) -> bool {
        matches!(self, Mode::Service | Mode::Swarm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Service => "service",
            Mode::Swarm => "swarm",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL path matching class for generated ACL rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathType {
    /// Prefix match (`path_beg`). The default.
    #[default]
    Beg,
    /// Regular-expression match (`path_reg`).
    Reg,
}

impl PathType {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("path_reg") {
            PathType::Reg
        } else {
            PathType::Beg
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathType::Beg => "path_beg",
            PathType::Reg => "path_reg",
        }
    }
}

/// Basic-auth credential protecting a service's routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    /// Parse the `user1:pass1,user2:pass2` wire format. Entries without a
    /// colon are skipped.
    pub fn parse_list(raw: &str) -> Vec<User> {
        raw.split(',')
            .filter_map(|pair| {
                let (username, password) = pair.split_once(':')?;
                Some(User {
                    username: username.trim().to_string(),
                    password: password.trim().to_string(),
                })
            })
            .collect()
    }
}

/// Cluster-wide configuration shared read-only by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseConfig {
    /// Registry endpoint URLs, scheme-normalized, tried in order.
    pub consul_addresses: Vec<String>,
    /// Identifier of this proxy instance; selects config file paths and
    /// scopes registry keys.
    pub instance_name: String,
    /// Address of an orchestrator-aware listener. When set, backend
    /// resolution goes through the registry even in swarm mode.
    pub listener_address: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Desired routing state for one service.
///
/// Field names follow the wire format used both in control API query
/// parameters and in registry KV entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSpec {
    pub service_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_path: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub outbound_hostname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub req_rep_search: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub req_rep_replace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template_fe_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template_be_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub consul_template_fe_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub consul_template_be_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub acl_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_check: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_cert: String,
    #[serde(skip_serializing_if = "is_false")]
    pub distribute: bool,
}

/// Rejection of a descriptor before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("serviceName is required")]
    MissingServiceName,
    #[error("servicePath is required when no custom template is supplied")]
    MissingServicePath,
    #[error("port is required in {0} mode")]
    MissingPort(String),
    #[error("reqRepSearch and reqRepReplace must be set together")]
    UnpairedRewrite,
}

impl ServiceSpec {
    pub fn parsed_mode(&self) -> Mode {
        Mode::parse(&self.mode)
    }

    pub fn parsed_path_type(&self) -> PathType {
        PathType::parse(&self.path_type)
    }

    /// Check descriptor completeness. Runs before template generation and
    /// before the config store is touched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.service_name.trim().is_empty() {
            return Err(ValidationError::MissingServiceName);
        }
        let mode = self.parsed_mode();
        if mode.is_swarm() && self.port.is_empty() {
            return Err(ValidationError::MissingPort(self.mode.clone()));
        }
        if !mode.is_swarm()
            && self.service_path.is_empty()
            && self.service_domain.is_empty()
            && self.consul_template_fe_path.is_empty()
            && self.template_fe_path.is_empty()
        {
            return Err(ValidationError::MissingServicePath);
        }
        if self.req_rep_search.is_empty() != self.req_rep_replace.is_empty() {
            return Err(ValidationError::UnpairedRewrite);
        }
        Ok(())
    }

    /// Name of the generated backend section, including the blue/green
    /// color suffix when one is set.
    pub fn backend_name(&self) -> String {
        if self.service_color.is_empty() {
            format!("{}-be", self.service_name)
        } else {
            format!("{}-be-{}", self.service_name, self.service_color)
        }
    }

    /// Identifier used in generated ACL rule names.
    pub fn acl_ident(&self) -> &str {
        if self.acl_name.is_empty() {
            &self.service_name
        } else {
            &self.acl_name
        }
    }

    /// Name the inline certificate is stored under: the first domain when
    /// domains are set, otherwise the service name.
    pub fn cert_name(&self) -> &str {
        self.service_domain
            .first()
            .map(String::as_str)
            .unwrap_or(&self.service_name)
    }

    /// Certificate content with escaped newlines decoded.
    pub fn decoded_cert(&self) -> String {
        self.service_cert.replace("\\n", "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_spec() -> ServiceSpec {
        ServiceSpec {
            service_name: "myService".to_string(),
            service_path: vec!["/api".to_string()],
            ..ServiceSpec::default()
        }
    }

    #[test]
    fn test_mode_parse_is_case_insensitive() {
        assert_eq!(Mode::parse("seRviCe"), Mode::Service);
        assert_eq!(Mode::parse("SWarM"), Mode::Swarm);
        assert_eq!(Mode::parse("default"), Mode::Default);
        assert_eq!(Mode::parse("anything-else"), Mode::Default);
        assert!(Mode::Service.is_swarm());
        assert!(Mode::Swarm.is_swarm());
        assert!(!Mode::Default.is_swarm());
    }

    #[test]
    fn test_path_type_parse() {
        assert_eq!(PathType::parse("path_reg"), PathType::Reg);
        assert_eq!(PathType::parse("PATH_REG"), PathType::Reg);
        assert_eq!(PathType::parse(""), PathType::Beg);
        assert_eq!(PathType::parse("path_beg"), PathType::Beg);
    }

    #[test]
    fn test_validate_rejects_missing_service_name() {
        let spec = ServiceSpec {
            service_name: "  ".to_string(),
            ..valid_spec()
        };
        assert_eq!(spec.validate(), Err(ValidationError::MissingServiceName));
    }

    #[test]
    fn test_validate_requires_port_in_swarm_mode() {
        let spec = ServiceSpec {
            mode: "swARM".to_string(),
            ..valid_spec()
        };
        assert_eq!(
            spec.validate(),
            Err(ValidationError::MissingPort("swARM".to_string()))
        );

        let spec = ServiceSpec {
            mode: "service".to_string(),
            port: "8080".to_string(),
            ..valid_spec()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_path_or_template() {
        let spec = ServiceSpec {
            service_name: "myService".to_string(),
            ..ServiceSpec::default()
        };
        assert_eq!(spec.validate(), Err(ValidationError::MissingServicePath));

        let spec = ServiceSpec {
            service_name: "myService".to_string(),
            consul_template_fe_path: "/templates/fe.tmpl".to_string(),
            ..ServiceSpec::default()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unpaired_rewrite() {
        let spec = ServiceSpec {
            req_rep_search: "/old".to_string(),
            ..valid_spec()
        };
        assert_eq!(spec.validate(), Err(ValidationError::UnpairedRewrite));

        let spec = ServiceSpec {
            req_rep_search: "/old".to_string(),
            req_rep_replace: "/new".to_string(),
            ..valid_spec()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_backend_name_includes_color() {
        let mut spec = valid_spec();
        assert_eq!(spec.backend_name(), "myService-be");
        spec.service_color = "pink".to_string();
        assert_eq!(spec.backend_name(), "myService-be-pink");
    }

    #[test]
    fn test_acl_ident_prefers_explicit_name() {
        let mut spec = valid_spec();
        assert_eq!(spec.acl_ident(), "myService");
        spec.acl_name = "my-acl".to_string();
        assert_eq!(spec.acl_ident(), "my-acl");
    }

    #[test]
    fn test_cert_name_prefers_first_domain() {
        let mut spec = valid_spec();
        assert_eq!(spec.cert_name(), "myService");
        spec.service_domain = vec!["my-domain.com".to_string(), "other.com".to_string()];
        assert_eq!(spec.cert_name(), "my-domain.com");
    }

    #[test]
    fn test_decoded_cert_unescapes_newlines() {
        let spec = ServiceSpec {
            service_cert: "line one\\nline two".to_string(),
            ..valid_spec()
        };
        assert_eq!(spec.decoded_cert(), "line one\nline two");
    }

    #[test]
    fn test_user_list_parsing() {
        let users = User::parse_list("user1:pass1,user2:pass2");
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "user1");
        assert_eq!(users[0].password, "pass1");
        assert_eq!(users[1].username, "user2");

        assert!(User::parse_list("").is_empty());
        assert!(User::parse_list("no-colon").is_empty());
    }

    #[test]
    fn test_serde_round_trip_uses_wire_names() {
        let spec = ServiceSpec {
            service_name: "myService".to_string(),
            service_path: vec!["/api".to_string()],
            req_rep_search: "/old".to_string(),
            req_rep_replace: "/new".to_string(),
            mode: "swaRM".to_string(),
            port: "1234".to_string(),
            ..ServiceSpec::default()
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"serviceName\":\"myService\""));
        assert!(json.contains("\"reqRepSearch\":\"/old\""));
        assert!(json.contains("\"mode\":\"swaRM\""));
        // Empty optional fields are omitted from the wire format.
        assert!(!json.contains("serviceColor"));
        assert!(!json.contains("skipCheck"));

        let back: ServiceSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
