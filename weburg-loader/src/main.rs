//! weburg-loader
//!
//! Downloads the Weburg.tv XSPF playlist and writes two M3U playlists: one
//! with raw multicast addresses, one going through a unicast HTTP proxy.
//!
//! Options come, by decreasing priority, from the command line, from
//! `WEBURG_CONFIG__*` environment variables, from `config.yaml` in the
//! configuration directory, and from built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde_yaml::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wbgconfig::Config;
use wbgplaylist::PlaylistConfigExt;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "weburg-loader";

#[derive(Debug, Parser)]
#[command(
    name = APP_NAME,
    version,
    about = "Tool for loading the Weburg.tv playlist in different formats"
)]
struct Cli {
    /// URL of the Weburg.tv XML playlist (a local path is accepted too)
    #[arg(long)]
    url: Option<String>,

    /// Host of the unicast proxy
    #[arg(long)]
    host: Option<String>,

    /// Port of the unicast proxy
    #[arg(long)]
    port: Option<u16>,

    /// File name of the generated multicast playlist
    #[arg(long, value_name = "PATH")]
    multicast_playlist: Option<PathBuf>,

    /// File name of the generated unicast playlist
    #[arg(long, value_name = "PATH")]
    unicast_playlist: Option<PathBuf>,

    /// Sort groups, and channels within groups, by name
    #[arg(long)]
    sort_by_name: bool,

    /// Timeout of the playlist download, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Configuration directory (defaults to $WEBURG_CONFIG, ./.weburg, ~/.weburg)
    #[arg(long, value_name = "DIR")]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Writes the options given on the command line over the loaded configuration
    fn apply_to(&self, config: &Config) -> Result<()> {
        if let Some(url) = &self.url {
            config.set_value(&["source", "url"], Value::from(url.as_str()))?;
        }
        if let Some(timeout) = self.timeout {
            config.set_value(&["source", "timeout_secs"], Value::from(timeout))?;
        }
        if let Some(host) = &self.host {
            config.set_value(&["proxy", "host"], Value::from(host.as_str()))?;
        }
        if let Some(port) = self.port {
            config.set_value(&["proxy", "port"], Value::from(port))?;
        }
        if let Some(path) = &self.multicast_playlist {
            config.set_value(
                &["output", "multicast_playlist"],
                Value::from(path.to_string_lossy().into_owned()),
            )?;
        }
        if let Some(path) = &self.unicast_playlist {
            config.set_value(
                &["output", "unicast_playlist"],
                Value::from(path.to_string_lossy().into_owned()),
            )?;
        }
        if self.sort_by_name {
            config.set_value(&["output", "sort_by_name"], Value::from(true))?;
        }
        Ok(())
    }

    fn log_level(&self, configured: &str) -> String {
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_config(cli.config.as_deref().unwrap_or(""))
        .context("Failed to load configuration")?;
    init_logging(&cli.log_level(&config.get_log_level()?));

    info!("{} v{} starting", APP_NAME, VERSION);
    // le chargement précède le subscriber : ses événements sont rejoués ici
    log_config_sources(&config);

    cli.apply_to(&config)?;
    let options = config
        .loader_options()
        .context("Missing proxy settings: pass --host and --port")?;

    let summary = wbgplaylist::run(options)?;

    info!(
        channels = summary.channels,
        groups = summary.groups,
        multicast = %summary.multicast_playlist.display(),
        unicast = %summary.unicast_playlist.display(),
        "Playlists generated"
    );
    Ok(())
}

fn log_config_sources(config: &Config) {
    debug!(config_dir = %config.config_dir().display(), "Using config directory");
    match config.loaded_file() {
        Some(file) => info!(config_file = %file.display(), "Loaded config file"),
        None => debug!("No config file, using default embedded config"),
    }
    for variable in config.env_overrides() {
        debug!(variable = %variable, "Applied config override from env");
    }
}

/// Initialize logging with tracing
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    let default_filter = format!(
        "warn,weburg_loader={level},wbgplaylist={level},wbgconfig={level}",
        level = level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
