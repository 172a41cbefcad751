// # wandnsd - WAN DNS refresh
//
// The wandnsd binary is a THIN integration layer. It is responsible for:
// 1. Parsing command line flags
// 2. Loading the record configuration file
// 3. Initializing logging and the runtime
// 4. Discovering the WAN IP and running one sync through wandns-core
//
// All matching, diffing and batching logic lives in wandns-core.
//
// ## Flags
//
// - `--config <path>`: JSON configuration file (default: `config.json`)
// - `--dry-run`: Log the changes that would be made without making them
//
// AWS credentials and region come from the standard AWS configuration chain.
//
// ## Example
//
// ```bash
// cat > config.json <<'JSON'
// { "route53records": { "A": ["home.example.com", "vpn.example.com"] } }
// JSON
//
// wandnsd --config config.json --dry-run
// ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use wandns_core::traits::IpVersion;
use wandns_core::{IpSource, SyncConfig, SyncEngine};
use wandns_ip_http::{DEFAULT_IP_SERVICE, HttpIpSource};
use wandns_provider_route53::Route53Provider;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Sync completed
/// - 1: Configuration or startup error
/// - 2: Runtime error (WAN IP discovery or DNS provider failure)
#[derive(Debug, Clone, Copy)]
enum WandnsExitCode {
    /// Sync completed (including dry runs and no-op runs)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<WandnsExitCode> for ExitCode {
    fn from(code: WandnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Command line flags
#[derive(Debug, Parser)]
#[command(name = "wandnsd", version, about = "Point Route 53 address records at the current WAN IP")]
struct Cli {
    /// The name of the configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// If set, the program will not make any changes
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                WandnsExitCode::ConfigError.into()
            } else {
                // --help and --version
                WandnsExitCode::Success.into()
            };
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WandnsExitCode::ConfigError.into();
    }

    // Load configuration before touching the network
    let config = match SyncConfig::from_file(&cli.config) {
        Ok(config) => config.with_dry_run(cli.dry_run),
        Err(e) => {
            error!("Error reading config: {}", e);
            return WandnsExitCode::ConfigError.into();
        }
    };

    // A sync is strictly sequential, a single-threaded runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WandnsExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_sync(config).await {
            error!("{:#}", e);
            WandnsExitCode::RuntimeError
        } else {
            WandnsExitCode::Success
        }
    });

    result.into()
}

/// Discover the WAN IP and run one sync
async fn run_sync(config: SyncConfig) -> Result<()> {
    let provider = Route53Provider::from_env().await;

    info!("Config: {:?}", config);

    // Only A records are managed, so only an IPv4 answer is useful
    let ip_source = HttpIpSource::new(DEFAULT_IP_SERVICE, Some(IpVersion::V4));
    let wan_ip = ip_source
        .current()
        .await
        .context("Error getting WAN IP")?;
    info!("WAN IP: {}", wan_ip);

    let (engine, _events) = SyncEngine::new(Box::new(provider), config)?;
    engine
        .run(wan_ip)
        .await
        .context("Error updating Route53 records")?;

    Ok(())
}
