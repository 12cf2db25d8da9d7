use std::collections::HashMap;
use std::net::SocketAddr;

use ::config::{Config, ConfigError as BuilderError, Environment, File};
use axum::http::HeaderValue;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Browser origins allowed to call the API. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RuntimeEnvConfig {
    #[serde(default)]
    pub http_proxy: Option<String>,
    #[serde(default)]
    pub https_proxy: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerSettings {
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub runtime_env: Option<RuntimeEnvConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidAddr(String),
    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
    #[error("configuration load failed: {0}")]
    Load(#[from] BuilderError),
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self
            .server
            .as_ref()
            .map(|server| server.bind.clone())
            .unwrap_or_else(default_bind);
        bind.parse().map_err(|_| ConfigError::InvalidAddr(bind))
    }

    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        let Some(server) = &self.server else {
            return Ok(Vec::new());
        };
        server
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim())
                    .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
            })
            .collect()
    }

    /// Outbound calls to the generative service go through these proxies.
    pub fn apply_runtime_env(&self) {
        if let Some(runtime) = &self.runtime_env {
            if let Some(proxy) = &runtime.http_proxy {
                std::env::set_var("HTTP_PROXY", proxy);
                std::env::set_var("http_proxy", proxy);
            }
            if let Some(proxy) = &runtime.https_proxy {
                std::env::set_var("HTTPS_PROXY", proxy);
                std::env::set_var("https_proxy", proxy);
            }
        }
    }
}

pub fn load_server_settings() -> Result<ServerSettings, ConfigError> {
    build_settings(DEFAULT_CONFIG_PATH, None)
}

/// `env` replaces the process environment when given.
fn build_settings(
    path: &str,
    env: Option<HashMap<String, String>>,
) -> Result<ServerSettings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("PREDICTPAL")
                .separator("__")
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_port_3000() {
        let settings = ServerSettings::default();
        assert_eq!(settings.bind_addr().unwrap().port(), 3000);
        assert!(settings.cors_origins().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_bind_address() {
        let settings = ServerSettings {
            server: Some(ServerConfig {
                bind: "localhost".to_string(),
                cors_origins: Vec::new(),
            }),
            runtime_env: None,
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(ConfigError::InvalidAddr(addr)) if addr == "localhost"
        ));
    }

    #[test]
    fn parses_cors_origins() {
        let settings = ServerSettings {
            server: Some(ServerConfig {
                bind: default_bind(),
                cors_origins: vec!["https://predictpal.app".to_string()],
            }),
            runtime_env: None,
        };
        let origins = settings.cors_origins().unwrap();
        assert_eq!(origins, vec![HeaderValue::from_static("https://predictpal.app")]);
    }

    #[test]
    fn reads_yaml_source() {
        let settings: ServerSettings = Config::builder()
            .add_source(::config::File::from_str(
                "server:\n  bind: 127.0.0.1:8080\n  cors_origins: [\"http://localhost:9002\"]\n",
                ::config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(settings.cors_origins().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_and_empty_env_give_defaults() {
        let settings = build_settings("config/missing-for-test", Some(HashMap::new())).unwrap();
        assert!(settings.server.is_none());
        assert_eq!(settings.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn env_overrides_bind_address() {
        let env = HashMap::from([(
            "PREDICTPAL__SERVER__BIND".to_string(),
            "127.0.0.1:4000".to_string(),
        )]);
        let settings = build_settings("config/missing-for-test", Some(env)).unwrap();
        assert_eq!(settings.bind_addr().unwrap().to_string(), "127.0.0.1:4000");
    }

    #[test]
    fn malformed_env_value_is_an_error() {
        let env = HashMap::from([(
            "PREDICTPAL__SERVER__CORS_ORIGINS".to_string(),
            "https://predictpal.app".to_string(),
        )]);
        assert!(matches!(
            build_settings("config/missing-for-test", Some(env)),
            Err(ConfigError::Load(_))
        ));
    }
}
