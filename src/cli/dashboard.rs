//! Aggregate views: `sli`, `uptime`, `stats`

use crate::analytics::{comparison_label, daily_uptime};
use crate::api::ApiClient;
use crate::cli::{output, SliArgs, StatsArgs, UptimeArgs};
use crate::model::UptimeType;
use chrono::Utc;

/// Handle `reqwatch sli` command
pub async fn handle_sli(args: &SliArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;

    let now = Utc::now();
    let from = args.timeframe.from(now);
    let snapshot = api.sli(from).await?;
    let comparison = comparison_label(from, now);
    tracing::debug!(timeframe = args.timeframe.as_str(), "Loaded SLI snapshot");

    if args.json {
        Ok(output::format_sli_json(&snapshot, comparison))
    } else {
        Ok(output::format_sli_table(&snapshot, comparison))
    }
}

/// Handle `reqwatch uptime` command
pub async fn handle_uptime(args: &UptimeArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;

    if args.total {
        let samples = api.uptime(UptimeType::Total).await?;
        return Ok(if args.json {
            output::format_uptime_json(&samples)
        } else {
            output::format_total_uptime_table(&samples)
        });
    }

    let samples = api.uptime(UptimeType::PerHour).await?;
    let rollups = daily_uptime(&samples);
    tracing::debug!(
        samples = samples.len(),
        days = rollups.len(),
        "Rolled up hourly uptime"
    );
    Ok(if args.json {
        output::format_uptime_json(&rollups)
    } else {
        output::format_daily_uptime_table(&rollups)
    })
}

/// Handle `reqwatch stats` command
pub async fn handle_stats(args: &StatsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;

    let from = args.timeframe.from(Utc::now());
    let (points, counts) = tokio::try_join!(api.requests_stats(from), api.requests_by_status(from))?;

    if args.json {
        Ok(output::format_stats_json(&points, &counts))
    } else {
        Ok(output::format_stats_table(&points, &counts))
    }
}
