//! Historical request log commands (`requests`, `suggest`)

use crate::api::ApiClient;
use crate::cli::{output, RequestsArgs, SuggestArgs};
use crate::config::ReqwatchConfig;
use crate::filter::{FilterStore, FilterUpdate, PaginationUpdate, ResponseTimeBound};
use crate::mode::{DataSource, SelectionReset};
use crate::pagination::PaginationController;
use crate::query::{HistoricalQueryEngine, QueryOutcome, SuggestionFetcher};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn parse_instant(flag: &str, value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid --{} '{}': {}", flag, value, e))
}

/// Populate the store from the command-line filters.
fn apply_filters(
    store: &FilterStore,
    args: &RequestsArgs,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(preset) = args.range {
        store.apply_preset(preset, now);
    } else if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let from = parse_instant("from", from)?;
        let to = parse_instant("to", to)?;
        if from > to {
            return Err("--from must not be later than --to".into());
        }
        store.set_time_range(from, to);
    }

    let mut update = FilterUpdate::new();
    if let Some(search) = &args.search {
        update = update.search(search.as_str());
    }
    if let Some(method) = args.method {
        update = update.method(method);
    }
    if let Some(status) = &args.status {
        update = update.status(status.as_str());
    }
    if let Some(gt) = &args.slower_than {
        update = update.response_time(ResponseTimeBound::GreaterThan, gt.as_str());
    }
    if let Some(lt) = &args.faster_than {
        update = update.response_time(ResponseTimeBound::LessThan, lt.as_str());
    }
    store.set_filter(update);
    Ok(())
}

async fn run_query(
    engine: &HistoricalQueryEngine,
    store: &FilterStore,
) -> Result<QueryOutcome, Box<dyn std::error::Error>> {
    let rev = store.revision();
    let handle = engine
        .issue(&rev.filter, &rev.pagination)
        .ok_or("A time range is required")?;
    handle.await?;

    let outcome = engine.outcome();
    if let Some(e) = &outcome.error {
        return Err(format!("Failed to load requests: {}", e).into());
    }
    Ok(outcome)
}

/// Fetch and render one page of the request log.
pub async fn fetch_requests_page(
    config: &ReqwatchConfig,
    args: &RequestsArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let page_size = args.limit.unwrap_or(config.query.default_page_size);

    let store = FilterStore::with_defaults(config.query.default_page_size, now);
    let (resets, _) = broadcast::channel::<SelectionReset>(16);
    let pages = PaginationController::new(store.clone(), resets);
    pages.set_page_size(page_size)?;
    apply_filters(&store, args, now)?;

    if args.page == 0 {
        return Err("--page starts at 1".into());
    }
    store.set_pagination(PaginationUpdate {
        page_offset: Some((args.page - 1) * page_size),
        ..Default::default()
    });

    let api = Arc::new(ApiClient::new(&config.api)?);
    let engine = HistoricalQueryEngine::new(api, &config.query);

    let mut outcome = run_query(&engine, &store).await?;
    let requested_offset = store.pagination().page_offset;
    store.set_total_items(outcome.page.total_items);
    if store.pagination().page_offset != requested_offset {
        tracing::warn!(
            page = args.page,
            total = outcome.page.total_items,
            "Requested page is past the end, showing the first page"
        );
        outcome = run_query(&engine, &store).await?;
        store.set_total_items(outcome.page.total_items);
    }

    let range_label = pages.range_label();
    let total_items = outcome.page.total_items;
    let source = DataSource::Historical(outcome.page);
    if args.json {
        return Ok(output::format_page_json(
            source.entries(),
            total_items,
            &range_label,
        ));
    }

    let table = output::format_data_source(&source);
    let mut footer = output::format_page_footer(&range_label, &store.applied_filters());
    if pages.controls_enabled() && pages.can_go_next() {
        let shown = pages.state();
        let next = shown.page_offset / shown.page_size + 2;
        footer.push_str(&format!("  (next: --page {})", next));
    }
    Ok(format!("{}\n{}", table, footer))
}

/// Handle `reqwatch requests` command
pub async fn handle_requests(args: &RequestsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    fetch_requests_page(&config, args).await
}

/// Handle `reqwatch suggest` command
pub async fn handle_suggest(args: &SuggestArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = crate::cli::init(&args.backend)?;
    let api = Arc::new(ApiClient::new(&config.api)?);
    let mut fetcher = SuggestionFetcher::new(
        api,
        Duration::from_millis(config.query.search_debounce_ms),
    );

    if let Some(handle) = fetcher.input(&args.keyword) {
        handle.await?;
    }

    let suggestions = fetcher.suggestions();
    if suggestions.is_empty() {
        return Ok(format!("No endpoints match '{}'", args.keyword.trim()));
    }
    Ok(suggestions.join("\n"))
}
