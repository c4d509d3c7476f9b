// src/main.rs

//! Entry point: parses CLI flags, layers them over a TOML config file,
//! initializes logging, and runs the server until shutdown.

use anyhow::Result;
use kvforge::config::{CliOverrides, Config};
use kvforge::server;
use std::env;
use tracing::error;

const HELP_TEXT: &str = "\
kvforge - an in-memory key-value store speaking a Redis-compatible wire protocol

USAGE:
    kvforge [OPTIONS]

OPTIONS:
    --config <path>           Load configuration from this TOML file (default: config.toml)
    --port <port>             Override the listening port
    --replicaof <host> <port> Start as a replica of the given master
    --dir <path>              Override the working directory
    --dbfilename <file>       Override the snapshot filename
    --help                    Print this help message and exit
";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help") {
        print!("{HELP_TEXT}");
        return Ok(());
    }

    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("config.toml");

    let base_config = if std::path::Path::new(config_path).exists() {
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from '{config_path}': {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let overrides = match parse_overrides(&args) {
        Ok(overrides) => overrides,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let config = overrides.apply(base_config);

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .compact()
        .init();

    if let Err(e) = server::run(config).await {
        error!("server error: {e}");
        return Err(e);
    }

    Ok(())
}

fn parse_overrides(args: &[String]) -> Result<CliOverrides> {
    let mut overrides = CliOverrides::default();

    if let Some(i) = args.iter().position(|a| a == "--port") {
        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow::anyhow!("--port flag requires a value"))?;
        overrides.port = Some(
            value
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid port number: {value}"))?,
        );
    }

    if let Some(i) = args.iter().position(|a| a == "--replicaof") {
        let host = args
            .get(i + 1)
            .ok_or_else(|| anyhow::anyhow!("--replicaof flag requires <host> <port>"))?;
        let port = args
            .get(i + 2)
            .ok_or_else(|| anyhow::anyhow!("--replicaof flag requires <host> <port>"))?;
        overrides.replicaof = Some((
            host.clone(),
            port.parse()
                .map_err(|_| anyhow::anyhow!("invalid replicaof port: {port}"))?,
        ));
    }

    if let Some(i) = args.iter().position(|a| a == "--dir") {
        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow::anyhow!("--dir flag requires a value"))?;
        overrides.dir = Some(value.clone());
    }

    if let Some(i) = args.iter().position(|a| a == "--dbfilename") {
        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow::anyhow!("--dbfilename flag requires a value"))?;
        overrides.dbfilename = Some(value.clone());
    }

    Ok(overrides)
}
