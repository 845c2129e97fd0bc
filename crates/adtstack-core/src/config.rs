//! Connection configuration.
//!
//! Provides [`ConnectionConfig`] describing how to reach an ADT server.
//! Values are loaded from environment variables with the `SAP_` prefix.

use std::fmt;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::TransportError;

/// How to reach and authenticate against an ADT server.
///
/// # Examples
///
/// ```
/// use adtstack_core::ConnectionConfig;
///
/// let config = ConnectionConfig::builder()
///     .host("sap.example.com".to_owned())
///     .port(44300)
///     .build();
/// assert_eq!(config.base_url(), "https://sap.example.com:44300/sap/bc/adt/");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Application server host name.
    #[builder(default = String::from("localhost"))]
    pub host: String,

    /// HTTP(S) port.
    #[builder(default = 443)]
    pub port: u16,

    /// Whether to use HTTPS.
    #[builder(default = true)]
    pub ssl: bool,

    /// Whether to verify the server certificate.
    #[builder(default = true)]
    pub ssl_verify: bool,

    /// Logon client (`sap-client`).
    #[builder(default = String::from("001"))]
    pub client: String,

    /// Logon language (`sap-language`).
    #[builder(default = String::from("EN"))]
    pub language: String,

    /// User name for basic authentication.
    #[builder(default)]
    pub user: String,

    /// Password for basic authentication.
    #[builder(default)]
    #[serde(skip_serializing, default)]
    pub password: String,

    /// Log level filter string (e.g. `"warn"`, `"debug"`).
    #[builder(default = String::from("warn"))]
    pub log_level: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .field("ssl_verify", &self.ssl_verify)
            .field("client", &self.client)
            .field("language", &self.language)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ConnectionConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `SAP_ASHOST`, `SAP_PORT`, `SAP_SSL`, `SAP_SSL_VERIFY`,
    /// `SAP_CLIENT`, `SAP_LANGUAGE`, `SAP_USER`, `SAP_PASSWORD` and `LOG_LEVEL`.
    /// Without `SAP_PORT` the port follows the scheme (443 or 80).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] if `SAP_PORT` is not a port number.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TransportError> {
        let mut config = Self::default();

        if let Some(v) = lookup("SAP_ASHOST") {
            config.host = v;
        }
        if let Some(v) = lookup("SAP_SSL") {
            config.ssl = parse_flag(&v);
        }
        if let Some(v) = lookup("SAP_SSL_VERIFY") {
            config.ssl_verify = parse_flag(&v);
        }
        config.port = match lookup("SAP_PORT") {
            Some(v) => v
                .parse()
                .map_err(|e| TransportError::Config(format!("invalid SAP_PORT '{v}': {e}")))?,
            None if config.ssl => 443,
            None => 80,
        };
        if let Some(v) = lookup("SAP_CLIENT") {
            config.client = v;
        }
        if let Some(v) = lookup("SAP_LANGUAGE") {
            config.language = v;
        }
        if let Some(v) = lookup("SAP_USER") {
            config.user = v;
        }
        if let Some(v) = lookup("SAP_PASSWORD") {
            config.password = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }

    /// Root URL of the ADT REST interface, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}/sap/bc/adt/", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    !(value == "0" || value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 443);
        assert!(config.ssl);
        assert_eq!(config.client, "001");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_should_load_config_from_lookup() {
        let config = ConnectionConfig::from_lookup(lookup_from(&[
            ("SAP_ASHOST", "vhcalnplci"),
            ("SAP_SSL", "no"),
            ("SAP_CLIENT", "100"),
            ("SAP_USER", "DEVELOPER"),
            ("SAP_PASSWORD", "secret"),
        ]))
        .expect("valid config");

        assert_eq!(config.host, "vhcalnplci");
        assert!(!config.ssl);
        assert_eq!(config.port, 80);
        assert_eq!(config.client, "100");
        assert_eq!(config.base_url(), "http://vhcalnplci:80/sap/bc/adt/");
    }

    #[test]
    fn test_should_reject_invalid_port() {
        let err = ConnectionConfig::from_lookup(lookup_from(&[("SAP_PORT", "https")]))
            .expect_err("port must be numeric");
        assert!(matches!(err, TransportError::Config(_)));
    }

    #[test]
    fn test_should_redact_password_in_debug_output() {
        let config = ConnectionConfig::builder().password("secret".to_owned()).build();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
