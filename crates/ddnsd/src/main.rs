// # ddnsd - DDNS Daemon
//
// The ddnsd daemon is a thin integration layer. It is responsible for:
// 1. Reading configuration from command-line flags / environment variables
// 2. Initializing logging and the runtime
// 3. Building the IP sources and the No-IP provider
// 4. Running the DDNS engine until SIGINT/SIGTERM
//
// All update logic lives in ddns-core and the source/provider crates.
//
// ## Configuration
//
// Every flag can also be set through the environment:
//
// - `--interval` / `DDNS_INTERVAL`: Time between updates (default `1h`)
// - `--username` / `DDNS_USERNAME`: No-IP username (required)
// - `--password` / `DDNS_PASSWORD`: No-IP password (required)
// - `--dns` / `DDNS_HOSTNAME`: Hostname to update (required)
// - `--no-ipv6` / `DDNS_DISABLE_IPV6`: Skip interface IPv6 resolution
// - `--interface` / `DDNS_INTERFACE`: Only look for IPv6 on this interface
// - `--ip-lookup-url` / `DDNS_IP_LOOKUP_URL`: IPv4 lookup service
// - `--update-url` / `DDNS_UPDATE_URL`: No-IP update endpoint
// - `--log-level` / `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export DDNS_USERNAME=me@example.com
// export DDNS_PASSWORD=hunter2
//
// ddnsd --dns myhost.ddns.net --interval 30m
// ```

use anyhow::Result;
use clap::{ArgAction, Parser};
use clap::builder::FalseyValueParser;
use ddns_core::traits::IpSource;
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_http::HttpIpSource;
use ddns_provider_noip::NoIpProvider;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Command-line arguments
#[derive(Parser)]
#[command(name = "ddnsd", version)]
#[command(about = "Keeps a No-IP hostname pointed at this machine's public addresses")]
struct Args {
    /// Time between updates (e.g. "1h", "30m", "1h 30m")
    #[arg(long, env = "DDNS_INTERVAL", default_value = ddns_core::config::DEFAULT_INTERVAL)]
    interval: String,

    /// No-IP username
    #[arg(long, env = "DDNS_USERNAME")]
    username: String,

    /// No-IP password
    #[arg(long, env = "DDNS_PASSWORD", hide_env_values = true)]
    password: String,

    /// Hostname to update
    #[arg(long = "dns", visible_alias = "hostname", env = "DDNS_HOSTNAME")]
    dns: String,

    /// Do not resolve a public IPv6 from local interfaces
    #[arg(
        long,
        env = "DDNS_DISABLE_IPV6",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    no_ipv6: bool,

    /// Only look for a public IPv6 on this interface (e.g. "eth0")
    #[arg(long, env = "DDNS_INTERFACE")]
    interface: Option<String>,

    /// IPv4 lookup service (must answer {"query": "<ip>"})
    #[arg(long, env = "DDNS_IP_LOOKUP_URL", default_value = ddns_ip_http::DEFAULT_LOOKUP_URL)]
    ip_lookup_url: String,

    /// No-IP compatible update endpoint
    #[arg(long, env = "DDNS_UPDATE_URL", default_value = ddns_provider_noip::NOIP_UPDATE_URL)]
    update_url: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Build the immutable engine configuration
    fn to_config(&self) -> Result<DdnsConfig> {
        let config = DdnsConfig::new(&self.interval, &self.username, &self.password, &self.dns)?
            .with_ipv6(!self.no_ipv6 && cfg!(feature = "interface"));

        Ok(config)
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let log_level = match args.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let config = match args.to_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!(
        hostname = %config.hostname,
        interval = ?config.interval,
        ipv6 = config.ipv6,
        "Starting ddnsd daemon"
    );

    let engine = match build_engine(&args, &config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Failed to initialize DDNS engine");
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(engine).await {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the IP sources and provider, and wire them into an engine
fn build_engine(args: &Args, config: &DdnsConfig) -> Result<DdnsEngine> {
    let ipv4_source: Box<dyn IpSource> = Box::new(HttpIpSource::with_url(&args.ip_lookup_url)?);
    info!(url = %args.ip_lookup_url, "IPv4 source: HTTP lookup");

    let ip_sources: Vec<Box<dyn IpSource>> = std::iter::once(ipv4_source)
        .chain(ipv6_source(args, config))
        .collect();

    let provider = NoIpProvider::with_update_url(config.credentials.clone(), &args.update_url)?;
    info!(url = %provider.update_url(), "Provider: No-IP");

    // Nothing consumes engine events in the daemon; logs carry the same information
    let (engine, event_rx) = DdnsEngine::new(ip_sources, Box::new(provider), config)?;
    drop(event_rx);

    Ok(engine)
}

/// Interface IPv6 source, unless disabled
#[cfg(feature = "interface")]
fn ipv6_source(args: &Args, config: &DdnsConfig) -> Option<Box<dyn IpSource>> {
    use ddns_ip_interface::InterfaceIpSource;

    if !config.ipv6 {
        return None;
    }

    let source = match &args.interface {
        Some(name) => InterfaceIpSource::for_interface(name),
        None => InterfaceIpSource::new(),
    };
    info!(
        interface = args.interface.as_deref().unwrap_or("any"),
        "IPv6 source: local interfaces"
    );

    Some(Box::new(source))
}

/// Built without interface support: IPv4 only
#[cfg(not(feature = "interface"))]
fn ipv6_source(args: &Args, _config: &DdnsConfig) -> Option<Box<dyn IpSource>> {
    if args.interface.is_some() {
        tracing::warn!("--interface ignored: built without the interface feature");
    }

    None
}

/// Run the daemon
async fn run_daemon(engine: DdnsEngine) -> Result<()> {
    engine
        .run_until(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => {
                    error!("Shutdown error: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received, or an error if the handlers
/// could not be installed.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;

    Ok("SIGINT")
}
