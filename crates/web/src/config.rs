use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "CO2CALC";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Plain,
}

/// Runtime settings for the web server.
///
/// Resolved from built-in defaults, an optional TOML file, `CO2CALC_*`
/// environment variables and finally command line flags, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Verbose logging when no explicit `log_level` is set.
    pub debug: bool,
    #[serde(default)]
    pub log_level: Option<String>,
    pub log_format: LogFormat,
}

impl WebConfig {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Like [`WebConfig::load`], reading environment variables from `env`
    /// instead of the process environment when it is given.
    pub fn load_with_env(
        config_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("debug", false)?
            .set_default("log_format", "pretty")?;

        if let Some(path) = config_path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>, debug: bool) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if debug {
            self.debug = true;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn effective_log_level(&self) -> &str {
        match &self.log_level {
            Some(level) => level,
            None if self.debug => "debug",
            None => "info",
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            log_level: None,
            log_format: LogFormat::Pretty,
        }
    }
}
