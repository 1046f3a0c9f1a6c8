//! Request-scoped metadata consumed by the logger.

use std::env;

use rand::RngCore;

/// Read-only source of the metadata attached to every record.
///
/// The logger queries it once per accepted `log` call.
pub trait RequestContext: Send + Sync {
    fn request_id(&self) -> String;
    fn is_cli(&self) -> bool;
    fn server_host(&self) -> String;
    fn server_ip(&self) -> String;
    fn client_ip(&self) -> String;
}

/// Fixed metadata, set up front. Useful for injection and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticContext {
    pub request_id: String,
    pub cli: bool,
    pub server_host: String,
    pub server_ip: String,
    pub client_ip: String,
}

impl StaticContext {
    /// A non-interactive context with the given request id and no addresses.
    pub fn cli(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cli: true,
            ..Self::default()
        }
    }
}

impl RequestContext for StaticContext {
    fn request_id(&self) -> String {
        self.request_id.clone()
    }

    fn is_cli(&self) -> bool {
        self.cli
    }

    fn server_host(&self) -> String {
        self.server_host.clone()
    }

    fn server_ip(&self) -> String {
        self.server_ip.clone()
    }

    fn client_ip(&self) -> String {
        self.client_ip.clone()
    }
}

/// Metadata derived from the process environment.
///
/// The request id is generated once, when the context is created. Host and
/// address fields follow the CGI variable names; under a plain process they
/// are empty and `is_cli` is `true`.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    request_id: String,
}

impl ProcessContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: generate_request_id(),
        }
    }

    /// Uses a caller-supplied id, e.g. one propagated from an upstream header.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for ProcessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext for ProcessContext {
    fn request_id(&self) -> String {
        self.request_id.clone()
    }

    fn is_cli(&self) -> bool {
        cli_from(&process_env)
    }

    fn server_host(&self) -> String {
        server_host_from(&process_env)
    }

    fn server_ip(&self) -> String {
        server_ip_from(&process_env)
    }

    fn client_ip(&self) -> String {
        client_ip_from(&process_env)
    }
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    env::var_os(key).map(|value| value.to_string_lossy().into_owned())
}

fn cli_from(get: Lookup<'_>) -> bool {
    get("GATEWAY_INTERFACE").is_none()
}

fn server_host_from(get: Lookup<'_>) -> String {
    first_non_empty(get, &["HTTP_HOST", "SERVER_NAME"])
}

fn server_ip_from(get: Lookup<'_>) -> String {
    first_non_empty(get, &["SERVER_ADDR"])
}

fn client_ip_from(get: Lookup<'_>) -> String {
    // X-Forwarded-For may list a proxy chain; the first hop is the client.
    if let Some(forwarded) = get("HTTP_X_FORWARDED_FOR") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_owned();
        }
    }
    first_non_empty(get, &["REMOTE_ADDR"])
}

fn first_non_empty(get: Lookup<'_>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| get(key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// 16 lowercase hex digits from the thread RNG.
fn generate_request_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::collections::HashMap;

    fn fake_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_is_cli_with_blank_fields() {
        let get = fake_env(&[]);
        assert!(cli_from(&get));
        assert_eq!(server_host_from(&get), "");
        assert_eq!(server_ip_from(&get), "");
        assert_eq!(client_ip_from(&get), "");
    }

    #[test]
    fn gateway_interface_marks_a_request() {
        assert!(!cli_from(&fake_env(&[("GATEWAY_INTERFACE", "CGI/1.1")])));
        assert!(!cli_from(&fake_env(&[("GATEWAY_INTERFACE", "")])));
    }

    #[test]
    fn host_prefers_http_host_over_server_name() {
        let both = fake_env(&[("HTTP_HOST", "api.example.org"), ("SERVER_NAME", "srv01")]);
        assert_eq!(server_host_from(&both), "api.example.org");

        let name_only = fake_env(&[("SERVER_NAME", "srv01")]);
        assert_eq!(server_host_from(&name_only), "srv01");

        let blank_host = fake_env(&[("HTTP_HOST", ""), ("SERVER_NAME", "srv01")]);
        assert_eq!(server_host_from(&blank_host), "srv01");
    }

    #[test]
    fn server_ip_comes_from_server_addr() {
        let get = fake_env(&[("SERVER_ADDR", "10.0.0.5"), ("REMOTE_ADDR", "192.0.2.1")]);
        assert_eq!(server_ip_from(&get), "10.0.0.5");
    }

    #[test]
    fn client_ip_takes_first_forwarded_hop_then_remote_addr() {
        let chain = fake_env(&[
            ("HTTP_X_FORWARDED_FOR", " , 203.0.113.7, 10.0.0.1"),
            ("REMOTE_ADDR", "10.0.0.1"),
        ]);
        assert_eq!(client_ip_from(&chain), "203.0.113.7");

        let blank_forward =
            fake_env(&[("HTTP_X_FORWARDED_FOR", " , "), ("REMOTE_ADDR", "192.0.2.9")]);
        assert_eq!(client_ip_from(&blank_forward), "192.0.2.9");

        let remote_only = fake_env(&[("REMOTE_ADDR", "192.0.2.9")]);
        assert_eq!(client_ip_from(&remote_only), "192.0.2.9");
    }

    #[test]
    fn process_context_keeps_one_request_id() {
        let ctx = ProcessContext::new();
        let id = ctx.request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ctx.request_id(), id, "id must be stable for the context");
    }

    #[test]
    fn separate_contexts_get_distinct_ids() {
        let a = ProcessContext::new().request_id();
        let b = ProcessContext::new().request_id();
        assert_ne!(a, b);
    }

    #[test]
    fn explicit_request_id_is_used_verbatim() {
        let ctx = ProcessContext::with_request_id("upstream-42");
        assert_eq!(ctx.request_id(), "upstream-42");
    }

    #[test]
    fn static_context_reports_its_fields() {
        let ctx = StaticContext {
            request_id: "r1".into(),
            cli: false,
            server_host: "example.org".into(),
            server_ip: "10.0.0.2".into(),
            client_ip: "192.0.2.7".into(),
        };
        assert_eq!(ctx.request_id(), "r1");
        assert!(!ctx.is_cli());
        assert_eq!(ctx.server_host(), "example.org");
        assert_eq!(ctx.server_ip(), "10.0.0.2");
        assert_eq!(ctx.client_ip(), "192.0.2.7");

        let cli = StaticContext::cli("r2");
        assert!(cli.is_cli());
        assert!(cli.server_ip().is_empty());
    }
}
