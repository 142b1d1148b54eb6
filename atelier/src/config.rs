//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified
//! via the `-f` flag or the `ATELIER_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `ATELIER_`
//!
//! For nested values, use double underscores: `ATELIER_STORAGE__ROOT=/data`
//! sets `storage.root`.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding
//! - **Storage**: `storage.root`, `storage.max_upload_size` - the flat
//!   directory the file store treats as its entire namespace
//! - **Gateway**: `gateway.request_timeout`, `gateway.*_url` - outbound
//!   call bounds and provider base URLs
//! - **CORS**: `cors.allowed_origins` - origins of the browser editor

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ATELIER_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; all fields have defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// File store configuration
    pub storage: StorageConfig,
    /// AI gateway configuration
    pub gateway: GatewayConfig,
    /// CORS configuration for the browser editor
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// File store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// The single flat directory the file store owns. Created on first
    /// write or upload if absent.
    pub root: PathBuf,
    /// Maximum accepted upload body size in bytes
    pub max_upload_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// AI gateway configuration.
///
/// The base URLs default to the fixed production endpoints of the three
/// supported providers; overriding them changes only where requests are
/// sent, never the per-provider path, auth, or body shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bound on each outbound upstream call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// DeepSeek-compatible chat endpoint base URL
    pub deepseek_url: Url,
    /// Gemini-compatible generate-content endpoint base URL
    pub gemini_url: Url,
    /// OpenAI-compatible chat endpoint base URL
    pub openai_url: Url,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            deepseek_url: Url::parse("https://api.deepseek.com").expect("valid default URL"),
            gemini_url: Url::parse("https://generativelanguage.googleapis.com").expect("valid default URL"),
            openai_url: Url::parse("https://api.openai.com").expect("valid default URL"),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Origins allowed to call the API. `"*"` allows any origin.
    pub allowed_origins: Vec<CorsOrigin>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
        }
    }
}

/// A single allowed CORS origin: either the wildcard or a concrete URL.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl Serialize for CorsOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorsOrigin::Wildcard => serializer.serialize_str("*"),
            CorsOrigin::Url(url) => serializer.serialize_str(url.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "*" {
            Ok(CorsOrigin::Wildcard)
        } else {
            Url::parse(&raw).map(CorsOrigin::Url).map_err(serde::de::Error::custom)
        }
    }
}

impl Config {
    fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("ATELIER_").split("__"))
    }

    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.gateway.request_timeout.is_zero() {
            return Err("gateway.request_timeout must be non-zero".to_string());
        }
        if self.storage.max_upload_size == 0 {
            return Err("storage.max_upload_size must be non-zero".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
