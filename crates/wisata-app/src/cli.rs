//! CLI argument definitions for the Wisata application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Wisata - a conversational travel assistant over transport, promo,
/// destination and hotel datasets.
#[derive(Parser, Debug)]
#[command(name = "wisata", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the JSON HTTP API.
    Serve {
        /// API server port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Chat in the terminal.
    Chat,
}

impl CliArgs {
    /// Priority: --config flag > WISATA_CONFIG env var > ~/.wisata/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("WISATA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Whether the log level is settled before the config file is read,
    /// by `RUST_LOG` or the --log-level flag.
    pub fn log_level_is_fixed(&self, rust_log_set: bool) -> bool {
        rust_log_set || self.log_level.is_some()
    }

    /// Priority: --port flag > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        match self.command {
            Command::Serve { port: Some(p) } => p,
            _ => config_port,
        }
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".wisata").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".wisata").join("config.toml");
    }
    PathBuf::from("config.toml")
}
