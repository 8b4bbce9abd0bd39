//! `reqwatch tail`: follow the live request stream

use crate::cli::{output, TailArgs};
use crate::config::ReqwatchConfig;
use crate::mode::{DataSource, Mode, ModeController, SelectionReset};
use crate::query::QueryOutcome;
use crate::session::Session;
use crate::stream::{Connector, LiveStreamClient, WsConnector};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

fn render(source: &DataSource, json: bool) -> String {
    if json {
        return serde_json::to_string(source.entries()).unwrap_or_default();
    }
    format!(
        "== {} live requests ==\n{}",
        source.entries().len(),
        output::format_data_source(source)
    )
}

/// Stream snapshots to stdout until interrupted, `count` snapshots have been
/// printed, or the stream gives up.
pub async fn follow(
    config: &ReqwatchConfig,
    args: &TailArgs,
    connector: Arc<dyn Connector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(config.api.token.clone());
    if !session.is_authenticated() {
        return Err("Live mode requires a session token (--token or REQWATCH_TOKEN)".into());
    }

    let url = args.ws_url.clone().unwrap_or_else(|| config.api.stream_url());
    let stream = LiveStreamClient::new(connector, url, config.stream.clone(), session.clone());
    let (resets, _) = broadcast::channel::<SelectionReset>(16);
    // Only live entries are shown, so the historical side stays empty
    let (_outcomes_tx, outcomes) = watch::channel(QueryOutcome::default());
    let mut modes = ModeController::new(stream, outcomes, session.clone(), resets);

    let mut logged_out = session.subscribe();
    let mut snapshots = modes.stream().subscribe();
    let mut states = modes.stream().subscribe_state();
    modes.set_mode(Mode::Live)?;
    tracing::info!(url = modes.stream().url(), "Following live requests");

    let mut printed = 0usize;
    let result: Result<(), Box<dyn std::error::Error>> = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break Ok(());
            }
            event = logged_out.recv() => {
                let reason = event
                    .map(|e| e.reason)
                    .unwrap_or_else(|_| "session ended".to_string());
                break Err(format!("Logged out: {}", reason).into());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let _ = snapshots.borrow_and_update();
                let source = modes.data_source();
                if source.is_empty() {
                    continue;
                }
                println!("{}", render(&source, args.json));
                printed += 1;
                if args.count.is_some_and(|n| printed >= n) {
                    break Ok(());
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = *states.borrow_and_update();
                tracing::debug!(%state, "Live stream state");
            }
            _ = modes.live_stopped() => {
                if !session.is_authenticated() {
                    break Err("Logged out: the live stream rejected the session token".into());
                }
                break Err("Live stream closed".into());
            }
        }
    };

    modes.shutdown().await;
    result
}

/// Handle `reqwatch tail` command
pub async fn handle_tail(args: &TailArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    follow(&config, args, Arc::new(WsConnector)).await
}
