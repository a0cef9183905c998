// src/config.rs
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CLASSIFY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CODEGEN_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
/// Gemini caps inline request data at 20 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub max_upload_bytes: usize,
    pub gateway: GatewayConfig,
}

/// Everything the gateway needs, handed to it at construction.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub classify_model: String,
    pub codegen_model: String,
    /// `None` leaves the HTTP client's own default in place.
    pub request_timeout: Option<Duration>,
}

impl GatewayConfig {
    pub fn with_api_key(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
            classify_model: DEFAULT_CLASSIFY_MODEL.to_string(),
            codegen_model: DEFAULT_CODEGEN_MODEL.to_string(),
            request_timeout: None,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("classify_model", &self.classify_model)
            .field("codegen_model", &self.codegen_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup("API_KEY"));

        let mut gateway = GatewayConfig::with_api_key(api_key);
        if let Some(base) = lookup("GEMINI_API_BASE") {
            gateway.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("VISION_LAB_CLASSIFY_MODEL") {
            gateway.classify_model = model;
        }
        if let Some(model) = lookup("VISION_LAB_CODEGEN_MODEL") {
            gateway.codegen_model = model;
        }
        if let Some(secs) = lookup("VISION_LAB_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                anyhow::anyhow!("VISION_LAB_REQUEST_TIMEOUT_SECS must be a number of seconds: {}", e)
            })?;
            gateway.request_timeout = Some(Duration::from_secs(secs));
        }

        let max_upload_bytes = match lookup("VISION_LAB_MAX_UPLOAD_BYTES") {
            Some(bytes) => bytes.trim().parse::<usize>().map_err(|e| {
                anyhow::anyhow!("VISION_LAB_MAX_UPLOAD_BYTES must be a byte count: {}", e)
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind: lookup("VISION_LAB_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_upload_bytes,
            gateway,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.gateway.api_key.is_none());
        assert_eq!(config.gateway.classify_model, DEFAULT_CLASSIFY_MODEL);
        assert!(config.gateway.request_timeout.is_none());
    }

    #[test]
    fn falls_back_to_api_key_and_ignores_blank_values() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("API_KEY", "abc")]).unwrap();
        assert_eq!(config.gateway.api_key.as_deref(), Some("abc"));

        let config = config_from(&[("API_KEY", "")]).unwrap();
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("GEMINI_API_BASE", "http://localhost:9000/"),
            ("VISION_LAB_CODEGEN_MODEL", "gemini-2.5-pro"),
            ("VISION_LAB_REQUEST_TIMEOUT_SECS", "30"),
            ("VISION_LAB_MAX_UPLOAD_BYTES", "1048576"),
        ])
        .unwrap();

        assert_eq!(config.max_upload_bytes, 1_048_576);

        assert_eq!(config.gateway.api_base, "http://localhost:9000");
        assert_eq!(config.gateway.codegen_model, "gemini-2.5-pro");
        assert_eq!(config.gateway.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        assert!(config_from(&[("VISION_LAB_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("VISION_LAB_MAX_UPLOAD_BYTES", "big")]).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let gateway = GatewayConfig::with_api_key(Some("secret-key".to_string()));
        let printed = format!("{:?}", gateway);
        assert!(!printed.contains("secret-key"));
    }
}
