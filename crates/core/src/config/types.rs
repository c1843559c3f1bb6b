use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub fetcher: FetcherConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// API key (required when method = "api_key")
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Log fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Path to the external log-fetch program
    pub script_path: PathBuf,
    /// Directory where the program drops archives (default: "logs")
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            fetcher: config.fetcher.clone(),
        }
    }
}
