//! Built-in fragment templates and placeholder substitution.

use std::path::Path;
use std::sync::Arc;

use crate::model::{PathType, ServiceSpec};
use crate::registry::BackendEndpoint;
use crate::template::{TemplateError, TemplateFileLoader};

/// Generated configuration text for one service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragments {
    /// Inbound matching and routing rules, rendered inside the shared
    /// frontend section.
    pub frontend: String,
    /// Server pool and health checking, rendered as top-level sections.
    pub backend: String,
}

/// Turns a service descriptor into a frontend/backend fragment pair.
pub struct TemplateGenerator {
    loader: Arc<dyn TemplateFileLoader>,
}

impl TemplateGenerator {
    pub fn new(loader: Arc<dyn TemplateFileLoader>) -> Self {
        Self { loader }
    }

    /// Generate both fragments for `spec`.
    ///
    /// `backends` carries endpoints resolved through the registry; it is
    /// empty in swarm mode without an orchestrator listener, in which case
    /// the backend fragment defers resolution to the proxy's own DNS
    /// resolver at reload time.
    pub async fn generate(
        &self,
        spec: &ServiceSpec,
        backends: &[BackendEndpoint],
    ) -> Result<Fragments, TemplateError> {
        spec.validate()?;

        let frontend = match override_path(&spec.consul_template_fe_path, &spec.template_fe_path) {
            Some(path) => {
                let raw = self.loader.read_template(Path::new(path)).await?;
                substitute(&raw, spec)
            }
            None => default_frontend(spec),
        };
        let backend = match override_path(&spec.consul_template_be_path, &spec.template_be_path) {
            Some(path) => {
                let raw = self.loader.read_template(Path::new(path)).await?;
                substitute(&raw, spec)
            }
            None => default_backend(spec, backends),
        };

        Ok(Fragments { frontend, backend })
    }
}

/// Registry-aware template paths take precedence over the plain overrides.
fn override_path<'a>(consul_path: &'a str, plain_path: &'a str) -> Option<&'a str> {
    if !consul_path.is_empty() {
        Some(consul_path)
    } else if !plain_path.is_empty() {
        Some(plain_path)
    } else {
        None
    }
}

fn default_frontend(spec: &ServiceSpec) -> String {
    let acl = spec.acl_ident();
    let mut out = String::new();
    let mut conditions: Vec<String> = Vec::new();

    // Domain ACLs come before path ACLs; the proxy routes on first match,
    // so ordering here is part of the contract.
    if !spec.service_domain.is_empty() {
        out.push_str(&format!(
            "    acl domain_{} hdr_dom(host) -i {}\n",
            acl,
            spec.service_domain.join(" ")
        ));
        conditions.push(format!("domain_{acl}"));
    }
    if !spec.service_path.is_empty() {
        let matcher = match spec.parsed_path_type() {
            PathType::Beg => "path_beg",
            PathType::Reg => "path_reg",
        };
        out.push_str(&format!(
            "    acl url_{} {} {}\n",
            acl,
            matcher,
            spec.service_path.join(" ")
        ));
        conditions.push(format!("url_{acl}"));
    }

    let guard = if conditions.is_empty() {
        String::new()
    } else {
        format!(" if {}", conditions.join(" "))
    };

    if !spec.req_rep_search.is_empty() {
        out.push_str(&format!(
            "    http-request replace-path {} {}{}\n",
            spec.req_rep_search, spec.req_rep_replace, guard
        ));
    }
    if !spec.users.is_empty() {
        out.push_str(&format!(
            "    acl auth_{} http_auth({}_users)\n",
            acl, spec.service_name
        ));
        let auth_guard = if conditions.is_empty() {
            format!(" if !auth_{acl}")
        } else {
            format!(" if {} !auth_{}", conditions.join(" "), acl)
        };
        out.push_str(&format!(
            "    http-request auth realm {}{}\n",
            spec.service_name, auth_guard
        ));
    }

    out.push_str(&format!(
        "    use_backend {}{}\n",
        spec.backend_name(),
        guard
    ));
    out
}

fn default_backend(spec: &ServiceSpec, backends: &[BackendEndpoint]) -> String {
    let mut out = String::new();

    // userlist is a top-level section, so it travels with the backend
    // fragment even though the auth directive lives in the frontend.
    if !spec.users.is_empty() {
        out.push_str(&format!("userlist {}_users\n", spec.service_name));
        for user in &spec.users {
            out.push_str(&format!(
                "    user {} insecure-password {}\n",
                user.username, user.password
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("backend {}\n", spec.backend_name()));
    out.push_str("    mode http\n");

    let check = if spec.skip_check { "" } else { " check" };
    if spec.parsed_mode().is_swarm() && backends.is_empty() {
        if spec.outbound_hostname.is_empty() {
            // Membership is resolved by the proxy's DNS resolver at reload
            // time, keyed by service name and port.
            out.push_str(&format!(
                "    server-template {} 1 {}:{}{} resolvers docker init-addr libc,none\n",
                spec.service_name, spec.service_name, spec.port, check
            ));
        } else {
            out.push_str(&format!(
                "    server {} {}:{}{}\n",
                spec.service_name, spec.outbound_hostname, spec.port, check
            ));
        }
    } else {
        for (index, endpoint) in backends.iter().enumerate() {
            out.push_str(&format!(
                "    server {}_{} {}:{}{}\n",
                spec.service_name, index, endpoint.address, endpoint.port, check
            ));
        }
    }
    out
}

fn substitute(template: &str, spec: &ServiceSpec) -> String {
    let replacements = [
        ("{{SERVICE_NAME}}", spec.service_name.clone()),
        ("{{ACL_NAME}}", spec.acl_ident().to_string()),
        ("{{BACKEND_NAME}}", spec.backend_name()),
        ("{{SERVICE_COLOR}}", spec.service_color.clone()),
        ("{{PORT}}", spec.port.clone()),
        ("{{OUTBOUND_HOSTNAME}}", spec.outbound_hostname.clone()),
        ("{{SERVICE_DOMAIN}}", spec.service_domain.join(" ")),
        ("{{SERVICE_PATH}}", spec.service_path.join(" ")),
        ("{{PATH_TYPE}}", spec.parsed_path_type().as_str().to_string()),
    ];
    let mut out = template.to_string();
    for (placeholder, value) in replacements {
        out = out.replace(placeholder, &value);
    }
    out
}
