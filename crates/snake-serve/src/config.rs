//! Configuration management for snake-serve.
//!
//! Configuration is loaded from (in order of precedence, highest first):
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables prefixed with `SNAKE_SERVE_`
//! 3. A TOML file, `snake-serve.toml` in the working directory by default
//! 4. Default values

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::handlers::{MimeProfile, StaticFileConfig};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "snake-serve.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SNAKE_SERVE_";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to listen on
    pub hostname: String,
    pub port: u16,
    /// Runtime worker threads
    pub workers: usize,
    /// Directory served at `/`
    pub root: PathBuf,
    pub index: String,
    /// Extra paths answering with the index file
    pub aliases: Vec<String>,
    pub mime: MimeProfile,
    /// Cache max-age in seconds, 0 disables Cache-Control
    pub max_age: u32,
    /// Serve dot files
    pub hidden: bool,
    /// Extra response headers
    pub headers: HashMap<String, String>,
    /// How long shutdown waits for open connections
    pub shutdown_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let files = StaticFileConfig::default();
        Self {
            hostname: "0.0.0.0".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            root: files.root,
            index: files.index,
            aliases: files.aliases,
            mime: files.mime,
            max_age: files.max_age,
            hidden: files.hidden,
            headers: files.headers,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, the default file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails to parse.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path. A custom
    /// path must exist; the default file is optional. Not validated, since
    /// command-line flags may still override values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or a source fails to parse.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }
        let config_file = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));

        let config = Figment::new()
            .merge(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be greater than 0".to_string()));
        }

        if self.index.is_empty() || self.index.contains('/') {
            return Err(Error::Config(format!(
                "index must be a plain file name, got {:?}",
                self.index
            )));
        }

        if let Some(alias) = self.aliases.iter().find(|a| !a.starts_with('/')) {
            return Err(Error::Config(format!(
                "alias must start with '/': {alias}"
            )));
        }

        self.addr()?;
        Ok(())
    }

    /// Handler configuration derived from this server configuration
    pub fn static_files(&self) -> StaticFileConfig {
        StaticFileConfig {
            root: self.root.clone(),
            index: self.index.clone(),
            aliases: self.aliases.clone(),
            mime: self.mime,
            max_age: self.max_age,
            headers: self.headers.clone(),
            hidden: self.hidden,
        }
    }

    /// Socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .hostname
            .parse()
            .map_err(|_| Error::Config(format!("invalid listen address: {}", self.hostname)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
