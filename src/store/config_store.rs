//! Ordered fragment storage and full-configuration rendering.

use crate::template::Fragments;

/// Static sections preceding the per-service fragments.
const PREAMBLE: &str = "global
    pidfile /var/run/haproxy.pid
    maxconn 4096
    tune.ssl.default-dh-param 2048

defaults
    mode http
    balance roundrobin
    option http-server-close
    option forwardfor
    timeout connect 5s
    timeout client 20s
    timeout server 20s
    timeout queue 30s
    timeout http-request 5s
    timeout http-keep-alive 15s

frontend services
    bind *:80
    bind *:443
    mode http
";

/// Point-in-time copy of the store, used for rollback.
pub type Snapshot = Vec<(String, Fragments)>;

/// Owns every service's fragment pair, keyed uniquely by service name.
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: Vec<(String, Fragments)>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the fragment pair for `service_name`.
    /// A replaced entry keeps its original position.
    pub fn upsert(&mut self, service_name: &str, fragments: Fragments) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name == service_name)
        {
            Some(entry) => entry.1 = fragments,
            None => self.entries.push((service_name.to_string(), fragments)),
        }
    }

    /// Remove a service's fragments. Unknown names are a no-op; the return
    /// value reports whether anything was removed.
    pub fn remove(&mut self, service_name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(name, _)| name != service_name);
        self.entries.len() != before
    }

    /// Render the full configuration text. Pure; callable at any time.
    pub fn render(&self) -> String {
        let mut config = String::from(PREAMBLE);
        for (_, fragments) in &self.entries {
            config.push_str(&fragments.frontend);
            if !fragments.frontend.ends_with('\n') {
                config.push('\n');
            }
        }
        config.push('\n');
        for (_, fragments) in &self.entries {
            config.push_str(&fragments.backend);
            if !fragments.backend.ends_with('\n') {
                config.push('\n');
            }
            config.push('\n');
        }
        config
    }

    pub fn snapshot(&self) -> Snapshot {
        self.entries.clone()
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.entries = snapshot;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, service_name: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == service_name)
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}
