//! Link settings from the config file and command line flags.

use anyhow::{Context, Result};
use clap::Args;
use impterm_ble::LinkConfig;
use std::path::Path;
use std::time::Duration;

/// Flags that override the config file.
#[derive(Debug, Default, Clone, Args)]
pub struct LinkArgs {
    /// Seconds to listen for advertisements on each scan
    #[arg(long, value_name = "SECS", value_parser = parse_seconds, global = true)]
    pub scan_window: Option<Duration>,

    /// Seconds allowed for discovery, including picking a terminal
    #[arg(long, value_name = "SECS", value_parser = parse_seconds, global = true)]
    pub discovery_timeout: Option<Duration>,

    /// Seconds allowed for each connect, service lookup and write
    #[arg(long, value_name = "SECS", value_parser = parse_seconds, global = true)]
    pub operation_timeout: Option<Duration>,

    /// Also offer terminals whose advertised name contains this text
    #[arg(long = "name", value_name = "TEXT", global = true)]
    pub name_filter: Option<String>,
}

/// Build the effective link configuration.
///
/// Starts from `path` when given, otherwise from the defaults, then applies
/// the flags.
pub fn resolve(path: Option<&Path>, args: &LinkArgs) -> Result<LinkConfig> {
    let base = match path {
        Some(path) => LinkConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LinkConfig::default(),
    };

    let config = apply(base, args);
    config.validate().context("Invalid link settings")?;
    Ok(config)
}

fn apply(mut config: LinkConfig, args: &LinkArgs) -> LinkConfig {
    if let Some(window) = args.scan_window {
        config.scan_window = window;
    }
    if let Some(timeout) = args.discovery_timeout {
        config.discovery_timeout = timeout;
    }
    if let Some(timeout) = args.operation_timeout {
        config.operation_timeout = timeout;
    }
    if let Some(name) = &args.name_filter {
        config.name_filter = Some(name.clone());
    }
    config
}

fn parse_seconds(input: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{input}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
