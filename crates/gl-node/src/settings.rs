//! Configuration layering: defaults, then the JSON file, then environment
//! overrides, then command-line flags.

use anyhow::{Context, Result};
use clap::Parser;
use gl_03_rpc_gateway::GatewayConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// GasLeap simulated parachain node
#[derive(Debug, Parser)]
#[command(name = "gl-node")]
#[command(about = "GasLeap simulated parachain with JSON-RPC and chain_newHead subscriptions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// HTTP JSON-RPC port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// WebSocket JSON-RPC port
    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Chain name reported by system_name
    #[arg(long)]
    pub chain_name: Option<String>,

    /// Block production period in milliseconds
    #[arg(long)]
    pub block_time_ms: Option<u64>,

    /// Start without demo-pool-1
    #[arg(long)]
    pub no_demo_pool: bool,
}

/// Builds the effective configuration. `env` looks up environment variables.
pub fn load(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let config: GatewayConfig = serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    apply_env(&mut config, env);
    apply_flags(&mut config, cli);

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn apply_env(config: &mut GatewayConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(port) = parsed::<u16>(&env, "GL_HTTP_PORT") {
        config.http.port = port;
    }
    if let Some(port) = parsed::<u16>(&env, "GL_WS_PORT") {
        config.websocket.port = port;
    }
    if let Some(name) = env("GL_CHAIN_NAME") {
        config.chain.name = name;
    }
    if let Some(ms) = parsed::<u64>(&env, "GL_BLOCK_TIME_MS") {
        config.chain.block_time = Duration::from_millis(ms);
    }
}

fn apply_flags(config: &mut GatewayConfig, cli: &Cli) {
    if let Some(port) = cli.http_port {
        config.http.port = port;
    }
    if let Some(port) = cli.ws_port {
        config.websocket.port = port;
    }
    if let Some(name) = &cli.chain_name {
        config.chain.name = name.clone();
    }
    if let Some(ms) = cli.block_time_ms {
        config.chain.block_time = Duration::from_millis(ms);
    }
    if cli.no_demo_pool {
        config.chain.seed_demo_pool = false;
    }
}

fn parsed<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("gl-node").chain(args.iter().copied()))
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = load(&cli(&[]), env(&[])).unwrap();
        assert_eq!(config.http.port, 9933);
        assert_eq!(config.websocket.port, 9944);
        assert_eq!(config.chain.block_time, Duration::from_secs(6));
        assert!(config.chain.seed_demo_pool);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = load(
            &cli(&[]),
            env(&[
                ("GL_HTTP_PORT", "8933"),
                ("GL_CHAIN_NAME", "Local Para"),
                ("GL_BLOCK_TIME_MS", "500"),
                ("GL_WS_PORT", "not-a-port"),
            ]),
        )
        .unwrap();
        assert_eq!(config.http.port, 8933);
        assert_eq!(config.websocket.port, 9944);
        assert_eq!(config.chain.name, "Local Para");
        assert_eq!(config.chain.block_time, Duration::from_millis(500));
    }

    #[test]
    fn test_flags_override_env() {
        let config = load(
            &cli(&["--http-port", "7000", "--block-time-ms", "250", "--no-demo-pool"]),
            env(&[("GL_HTTP_PORT", "8933"), ("GL_BLOCK_TIME_MS", "500")]),
        )
        .unwrap();
        assert_eq!(config.http.port, 7000);
        assert_eq!(config.chain.block_time, Duration::from_millis(250));
        assert!(!config.chain.seed_demo_pool);
    }

    #[test]
    fn test_invalid_result_rejected() {
        let result = load(&cli(&["--http-port", "9000", "--ws-port", "9000"]), env(&[]));
        assert!(result.is_err());

        let result = load(&cli(&["--block-time-ms", "0"]), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = load(&cli(&["--config", "/nonexistent/gl-node.json"]), env(&[]));
        assert!(result.is_err());
    }
}
