// src/config.rs

//! Server configuration: loading from a TOML file, then layering CLI-flag
//! overrides on top, per the ambient CLI surface (`--port`, `--replicaof`,
//! `--dir`, `--dbfilename`).

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_databases() -> usize {
    16
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_dbfilename() -> String {
    "dump.kvforge".to_string()
}

/// The fully resolved server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_databases")]
    pub databases: usize,
    /// `Some((host, port))` when started with `--replicaof`; `None` makes
    /// this process a master.
    #[serde(default)]
    pub replicaof: Option<(String, u16)>,
    #[serde(default = "default_dir")]
    pub dir: String,
    #[serde(default = "default_dbfilename")]
    pub dbfilename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            databases: default_databases(),
            replicaof: None,
            dir: default_dir(),
            dbfilename: default_dbfilename(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.databases == 0 {
            return Err(anyhow!("databases cannot be 0"));
        }
        if let Some((_, port)) = &self.replicaof
            && *port == 0
        {
            return Err(anyhow!("replicaof port cannot be 0"));
        }
        Ok(())
    }
}

/// Command-line overrides applied on top of the file-loaded (or default)
/// configuration. CLI flags always win over whatever the file specified.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub replicaof: Option<(String, u16)>,
    pub dir: Option<String>,
    pub dbfilename: Option<String>,
}

impl CliOverrides {
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(replicaof) = self.replicaof {
            config.replicaof = Some(replicaof);
        }
        if let Some(dir) = self.dir {
            config.dir = dir;
        }
        if let Some(dbfilename) = self.dbfilename {
            config.dbfilename = dbfilename;
        }
        config
    }
}
