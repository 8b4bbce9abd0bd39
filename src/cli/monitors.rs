//! Monitored endpoint commands

use crate::api::ApiClient;
use crate::cli::{output, MonitorsAddArgs, MonitorsListArgs, MonitorsRemoveArgs};
use crate::model::UptimeSetting;

/// Build the setting registered by `monitors add`.
pub fn setting_from_args(args: &MonitorsAddArgs) -> UptimeSetting {
    UptimeSetting {
        url: args.url.clone(),
        name: args.name.clone(),
        method: Some(args.method),
        interval: args.interval,
        enabled: Some(!args.disabled),
    }
}

/// Handle `reqwatch monitors list` command
pub async fn handle_monitors_list(
    args: &MonitorsListArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;
    let settings = api.uptime_settings().await?;

    if args.json {
        Ok(output::format_monitors_json(&settings))
    } else {
        Ok(output::format_monitors_table(&settings))
    }
}

/// Handle `reqwatch monitors add` command
pub async fn handle_monitors_add(
    args: &MonitorsAddArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    if !args.url.starts_with("http://") && !args.url.starts_with("https://") {
        return Err(format!("Invalid URL '{}': must start with http:// or https://", args.url).into());
    }
    if args.interval == Some(0) {
        return Err("--interval must be at least 1 second".into());
    }

    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;
    let response = api.add_uptime_setting(&setting_from_args(args)).await?;
    tracing::info!(url = %args.url, "Monitor added");

    if response.msg.is_empty() {
        Ok(format!("✓ Monitoring {} ({})", args.url, args.name))
    } else {
        Ok(format!("✓ {}", response.msg))
    }
}

/// Handle `reqwatch monitors remove` command
pub async fn handle_monitors_remove(
    args: &MonitorsRemoveArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = ApiClient::new(&config.api)?;
    let response = api.remove_uptime_setting(&args.url).await?;
    tracing::info!(url = %args.url, "Monitor removed");

    if response.msg.is_empty() {
        Ok(format!("✓ Stopped monitoring {}", args.url))
    } else {
        Ok(format!("✓ {}", response.msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BackendArgs;
    use crate::model::MonitorMethod;

    fn add_args(url: &str) -> MonitorsAddArgs {
        MonitorsAddArgs {
            backend: BackendArgs::default(),
            url: url.to_string(),
            name: "api".to_string(),
            method: MonitorMethod::PUT,
            interval: Some(30),
            disabled: true,
        }
    }

    #[test]
    fn test_setting_from_args() {
        let setting = setting_from_args(&add_args("https://a.example/health"));
        assert_eq!(setting.method, Some(MonitorMethod::PUT));
        assert_eq!(setting.interval, Some(30));
        assert_eq!(setting.enabled, Some(false));
    }

    #[tokio::test]
    async fn test_add_rejects_non_http_url() {
        let err = handle_monitors_add(&add_args("a.example/health"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn test_add_rejects_zero_interval() {
        let mut args = add_args("https://a.example/health");
        args.interval = Some(0);
        let err = handle_monitors_add(&args).await.unwrap_err();
        assert!(err.to_string().contains("--interval"));
    }
}
