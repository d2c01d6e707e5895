//! Client configuration from environment variables.

use std::path::PathBuf;

use reverb_tester_shared::{AuthConfig, ConnectionConfig, Scheme};

use crate::storage::Storage;

/// Startup configuration: initial form values and where presets live.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub auth: AuthConfig,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// Environment variables:
    /// - `REVERB_TESTER_HOST` (default: "localhost")
    /// - `REVERB_TESTER_PORT`: optional port
    /// - `REVERB_TESTER_KEY`: application key
    /// - `REVERB_TESTER_SCHEME`: "ws" | "wss" (default: "ws")
    /// - `REVERB_TESTER_CLUSTER`: optional cluster hint
    /// - `REVERB_TESTER_AUTH_ENDPOINT`: authorization endpoint; setting it enables auth
    /// - `REVERB_TESTER_AUTH_TOKEN`: bearer token sent to the endpoint
    /// - `REVERB_TESTER_CSRF_TOKEN`: value for `X-CSRF-TOKEN`
    /// - `REVERB_TESTER_DATA_DIR`: preset storage directory
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = ConnectionConfig::default();
        let scheme = match var("REVERB_TESTER_SCHEME").map(|s| s.parse::<Scheme>()) {
            Some(Ok(scheme)) => scheme,
            Some(Err(e)) => {
                crate::log_warn!("config: {}, using ws", e);
                Scheme::Ws
            }
            None => defaults.scheme,
        };
        let port = match var("REVERB_TESTER_PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => Some(port),
            Some(Err(e)) => {
                crate::log_warn!("config: ignoring REVERB_TESTER_PORT: {}", e);
                None
            }
            None => None,
        };

        let connection = ConnectionConfig {
            host: var("REVERB_TESTER_HOST").unwrap_or(defaults.host),
            port,
            key: var("REVERB_TESTER_KEY").unwrap_or_default(),
            scheme,
            cluster: var("REVERB_TESTER_CLUSTER").unwrap_or_default(),
        };

        let endpoint = var("REVERB_TESTER_AUTH_ENDPOINT").unwrap_or_default();
        let auth = AuthConfig {
            enabled: !endpoint.is_empty(),
            endpoint,
            bearer_token: var("REVERB_TESTER_AUTH_TOKEN").unwrap_or_default(),
            csrf_token: var("REVERB_TESTER_CSRF_TOKEN").unwrap_or_default(),
        };

        Self {
            connection,
            auth,
            data_dir: var("REVERB_TESTER_DATA_DIR").map(PathBuf::from),
        }
    }

    /// Storage for presets, honouring `data_dir` when set.
    pub fn storage(&self) -> Option<Storage> {
        match &self.data_dir {
            Some(dir) => Some(Storage::at(dir.clone())),
            None => Storage::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.connection, ConnectionConfig::default());
        assert_eq!(config.auth, AuthConfig::default());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn reads_connection_and_auth() {
        let config = AppConfig::from_lookup(lookup(&[
            ("REVERB_TESTER_HOST", "reverb.test"),
            ("REVERB_TESTER_PORT", "8080"),
            ("REVERB_TESTER_KEY", "app-key"),
            ("REVERB_TESTER_SCHEME", "wss"),
            ("REVERB_TESTER_AUTH_ENDPOINT", "https://reverb.test/broadcasting/auth"),
            ("REVERB_TESTER_AUTH_TOKEN", "secret"),
            ("REVERB_TESTER_DATA_DIR", "/tmp/presets"),
        ]));

        assert_eq!(config.connection.url(), "wss://reverb.test:8080");
        assert_eq!(config.connection.key, "app-key");
        assert!(config.auth.enabled);
        assert_eq!(config.auth.bearer_token, "secret");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/presets")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("REVERB_TESTER_PORT", "not-a-port"),
            ("REVERB_TESTER_SCHEME", "http"),
        ]));
        assert_eq!(config.connection.port, None);
        assert_eq!(config.connection.scheme, Scheme::Ws);
    }
}
