//! Account Gateway Binary
//!
//! Fetches account data from the configured brokerage and prints it as JSON.
//!
//! # Usage
//!
//! ```bash
//! account-gateway [summary|account|cash|buying-power|positions] [--config PATH]
//! ```
//!
//! # Environment Variables
//!
//! ## Required (when no config file is used)
//! - `ALPACA_KEY`: Broker API key
//! - `ALPACA_SECRET`: Broker API secret
//! - `ALPACA_ENDPOINT`: `paper`, `live`, or a base URL
//!
//! ## Optional
//! - `ALPACA_ENVIRONMENT`: PAPER | LIVE (inferred from the endpoint when unset)
//! - `ACCOUNT_GATEWAY_CONFIG`: Config file path (default: `account-gateway.yaml`)
//! - `GATEWAY_TIMEOUT_SECS`: Request timeout (default: 30)
//! - `GATEWAY_RETRY_MAX_ATTEMPTS`: Attempts per call (default: 1)
//! - `GATEWAY_CACHE_TTL_MS`: Snapshot cache TTL, 0 disables (default: 0)
//! - `METRICS_ADDR`: Prometheus listen address (metrics disabled when unset)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::path::PathBuf;

use account_gateway::config::load_settings;
use account_gateway::observability::{MetricsConfig, init_metrics};
use account_gateway::{AlpacaGateway, CancellationToken};
use anyhow::{Context, bail};
use serde::Serialize;
use tokio::signal;

/// What to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Summary,
    Account,
    Cash,
    BuyingPower,
    Positions,
}

impl Command {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "summary" => Some(Self::Summary),
            "account" => Some(Self::Account),
            "cash" => Some(Self::Cash),
            "buying-power" => Some(Self::BuyingPower),
            "positions" => Some(Self::Positions),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct CliArgs {
    command: Command,
    config: Option<PathBuf>,
}

const USAGE: &str =
    "usage: account-gateway [summary|account|cash|buying-power|positions] [--config PATH]";

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "Account gateway failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    if let Some(addr) = metrics_addr()? {
        init_metrics(&MetricsConfig::with_addr(addr)).context("starting metrics exporter")?;
        tracing::info!(%addr, "Metrics exporter listening");
    }

    let settings = load_settings(args.config.as_deref()).context("loading configuration")?;
    let config = settings.alpaca_config()?;

    let environment = config.environment;
    let base_url = config.base_url.clone();
    let max_attempts = config.retry.max_attempts;

    let cancel = CancellationToken::new();
    let gateway = AlpacaGateway::alpaca(config)?
        .with_cache_ttl(settings.cache_ttl())
        .scoped(cancel.clone());

    tracing::info!(
        %environment,
        %base_url,
        cache_ttl_ms = gateway.cache().ttl().map_or(0, |ttl| ttl.as_millis()),
        max_attempts,
        "Account gateway configured"
    );

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    match args.command {
        Command::Summary => print_json(&gateway.get_summary().await?),
        Command::Account => print_json(&gateway.get_account().await?),
        Command::Cash => print_json(&serde_json::json!({ "cash": gateway.get_cash().await? })),
        Command::BuyingPower => print_json(&serde_json::json!({
            "buying_power": gateway.get_buying_power().await?
        })),
        Command::Positions => print_json(&gateway.get_positions().await?),
    }
}

fn parse_args<I>(args: I) -> anyhow::Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut command = None;
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => bail!(USAGE),
            other => {
                if command.is_some() {
                    bail!("unexpected argument '{other}'\n{USAGE}");
                }
                command = Some(
                    Command::parse(other)
                        .with_context(|| format!("unknown command '{other}'\n{USAGE}"))?,
                );
            }
        }
    }

    Ok(CliArgs {
        command: command.unwrap_or(Command::Summary),
        config,
    })
}

fn metrics_addr() -> anyhow::Result<Option<SocketAddr>> {
    match std::env::var("METRICS_ADDR") {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .context("METRICS_ADDR must be a socket address"),
        _ => Ok(None),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{rendered}");
    Ok(())
}

/// Load `.env` from the working directory or the nearest ancestor that has one.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

#[allow(clippy::expect_used)] // Static directive; expect() is safe here
fn init_tracing() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "account_gateway=info"
                    .parse()
                    .expect("static directive 'account_gateway=info' is valid"),
            ),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn defaults_to_summary() {
        let parsed = parse_args(args(&[])).unwrap();
        assert_eq!(parsed.command, Command::Summary);
        assert!(parsed.config.is_none());
    }

    #[test]
    fn parses_command_and_config() {
        let parsed = parse_args(args(&["buying-power", "--config", "gw.yaml"])).unwrap();
        assert_eq!(parsed.command, Command::BuyingPower);
        assert_eq!(parsed.config, Some(PathBuf::from("gw.yaml")));
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(parse_args(args(&["orders"])).is_err());
        assert!(parse_args(args(&["cash", "positions"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
    }
}
