//! reqwatch - request-log data engine and console
//!
//! This library keeps the filter and pagination state of a request-log view,
//! turns it into historical queries against an HTTP observability backend,
//! tails the backend's live websocket feed, and derives the SLI and uptime
//! figures shown on its dashboard.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod filter;
pub mod logging;
pub mod mode;
pub mod model;
pub mod pagination;
pub mod query;
pub mod session;
pub mod stream;
