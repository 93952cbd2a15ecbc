//! Configuration loading from disk.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::config::schema::{ClientConfig, ServerConfig};
use crate::config::validation::{validate_client_config, validate_server_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate server configuration from a TOML file.
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = read_toml(path)?;
    validate_server_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate client configuration from a TOML file.
pub fn load_client_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = read_toml(path)?;
    validate_client_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rapid-reset-{}-{}", std::process::id(), name));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn partial_server_file_keeps_defaults() {
        let path = write_temp(
            "server.toml",
            "[listener]\nbind_address = \"127.0.0.1:4000\"\n[stream]\nslow_delay_ms = 250\n",
        );
        let config = load_server_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.stream.slow_delay_ms, 250);
        assert!(config.listener.tls.enabled);
        assert_eq!(config.listener.max_connections, 10_000);
    }

    #[test]
    fn client_file_overrides_attack() {
        let path = write_temp(
            "client.toml",
            "target = \"http://127.0.0.1:3000\"\n[attack]\nreset_count = 500\nreset_delay_ms = 5\n",
        );
        let config = load_client_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.target, "http://127.0.0.1:3000");
        assert_eq!(config.attack.reset_count, 500);
        assert_eq!(config.attack.reset_delay_ms, 5);
        assert_eq!(config.attack.inter_request_delay_ms, 50);
        assert_eq!(config.demo.normal_requests, 3);
    }

    #[test]
    fn invalid_values_are_reported() {
        let path = write_temp("bad.toml", "[listener]\nbind_address = \"nowhere\"\n");
        let err = load_server_config(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let path = write_temp("syntax.toml", "[listener\n");
        let err = load_server_config(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_client_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
