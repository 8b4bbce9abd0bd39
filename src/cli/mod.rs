//! CLI module for reqwatch
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `requests` - Show one page of the historical request log
//! - `tail` - Follow the live request stream
//! - `suggest` - Endpoint suggestions for a search keyword
//! - `sli` - Service-level indicators compared with the previous period
//! - `uptime` - Daily uptime per monitored URL
//! - `stats` - Failure-rate series and per-status counts
//! - `monitors` - Manage monitored endpoints (list, add, remove)
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Slow POST requests from the past week
//! reqwatch requests --range past-week --method post --slower-than 500
//!
//! # Follow live traffic
//! reqwatch tail --token "$TOKEN"
//! ```

pub mod completions;
pub mod config;
pub mod dashboard;
pub mod monitors;
pub mod output;
pub mod requests;
pub mod tail;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::ReqwatchConfig;
use crate::filter::{TimeRangePreset, Timeframe};
use crate::model::{HttpMethod, MonitorMethod};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// reqwatch - request log console
#[derive(Parser, Debug)]
#[command(
    name = "reqwatch",
    version,
    about = "Query, tail and summarize an HTTP request-observability backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show one page of the historical request log
    Requests(RequestsArgs),
    /// Follow the live request stream
    Tail(TailArgs),
    /// Suggest endpoints matching a keyword
    Suggest(SuggestArgs),
    /// Show SLIs compared with the previous period
    Sli(SliArgs),
    /// Show daily uptime per monitored URL
    Uptime(UptimeArgs),
    /// Show failure-rate series and per-status counts
    Stats(StatsArgs),
    /// Manage monitored endpoints
    #[command(subcommand)]
    Monitors(MonitorsCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to the backend.
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "reqwatch.toml")]
    pub config: PathBuf,

    /// Override the backend base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Session token sent as X-API-Key
    #[arg(long)]
    pub token: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestsArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Quick time range (today, past-week, past-month)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub range: Option<TimeRangePreset>,

    /// Start of the time range (RFC 3339)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End of the time range (RFC 3339)
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Endpoint keyword or full URL
    #[arg(short, long)]
    pub search: Option<String>,

    /// HTTP method (all, get, post, put, patch, delete, head, options)
    #[arg(short, long)]
    pub method: Option<HttpMethod>,

    /// Status code
    #[arg(long)]
    pub status: Option<String>,

    /// Only requests slower than this many milliseconds
    #[arg(long, conflicts_with = "faster_than")]
    pub slower_than: Option<String>,

    /// Only requests faster than this many milliseconds
    #[arg(long)]
    pub faster_than: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Page size (15, 50, 100)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TailArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Override the websocket URL
    #[arg(long)]
    pub ws_url: Option<String>,

    /// Exit after this many snapshots
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Keyword to look up
    pub keyword: String,
}

#[derive(Args, Debug)]
pub struct SliArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Look-back window (1w, 2d, 24h, 1h)
    #[arg(short, long, default_value = "24h")]
    pub timeframe: Timeframe,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UptimeArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Show the overall uptime per URL instead of the daily roll-up
    #[arg(long)]
    pub total: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Look-back window (1w, 2d, 24h, 1h)
    #[arg(short, long, default_value = "24h")]
    pub timeframe: Timeframe,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum MonitorsCommands {
    /// List monitored endpoints
    List(MonitorsListArgs),
    /// Start monitoring an endpoint
    Add(MonitorsAddArgs),
    /// Stop monitoring an endpoint
    Remove(MonitorsRemoveArgs),
}

#[derive(Args, Debug)]
pub struct MonitorsListArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MonitorsAddArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// URL to monitor
    pub url: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// HTTP method used by the pinger (GET, POST, PUT, DELETE)
    #[arg(short, long, default_value = "GET")]
    pub method: MonitorMethod,

    /// Seconds between pings
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Register the monitor without enabling it
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug)]
pub struct MonitorsRemoveArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// URL to stop monitoring
    pub url: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "reqwatch.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides
///
/// File (when present), then `REQWATCH_*` environment variables, then flags.
pub fn load_config(args: &BackendArgs) -> Result<ReqwatchConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        ReqwatchConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ReqwatchConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref token) = args.token {
        config.api.token = Some(token.clone());
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration and install the tracing subscriber.
pub fn init(args: &BackendArgs) -> Result<ReqwatchConfig, Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    crate::logging::init_tracing(&config.logging)?;
    Ok(config)
}
