//! Debounced endpoint suggestions for the search box.

use super::Debouncer;
use crate::api::SuggestionSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fetches suggestions for the keyword being typed, once typing pauses.
pub struct SuggestionFetcher {
    source: Arc<dyn SuggestionSource>,
    debouncer: Debouncer,
    latest: Arc<AtomicU64>,
    suggestions: Arc<watch::Sender<Vec<String>>>,
}

impl SuggestionFetcher {
    pub fn new(source: Arc<dyn SuggestionSource>, delay: Duration) -> Self {
        let (suggestions, _) = watch::channel(Vec::new());
        Self {
            source,
            debouncer: Debouncer::new(delay),
            latest: Arc::new(AtomicU64::new(0)),
            suggestions: Arc::new(suggestions),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.suggestions.subscribe()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.suggestions.borrow().clone()
    }

    /// Feed the current search text. An empty keyword clears the list right
    /// away; anything else is looked up after the debounce delay.
    pub fn input(&mut self, keyword: &str) -> Option<JoinHandle<()>> {
        let keyword = keyword.trim().to_string();
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        if keyword.is_empty() {
            self.debouncer.cancel();
            self.suggestions.send_replace(Vec::new());
            return None;
        }

        let source = self.source.clone();
        let latest = self.latest.clone();
        let suggestions = self.suggestions.clone();
        Some(self.debouncer.schedule(async move {
            let found = match source.search_suggestions(&keyword).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(keyword = %keyword, error = %e, "Suggestion lookup failed");
                    Vec::new()
                }
            };
            if latest.load(Ordering::SeqCst) == ticket {
                suggestions.send_replace(found);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSource {
        keywords: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SuggestionSource for RecordingSource {
        async fn search_suggestions(&self, keyword: &str) -> Result<Vec<String>, ApiError> {
            self.keywords.lock().unwrap().push(keyword.to_string());
            if keyword == "boom" {
                return Err(ApiError::Network("refused".to_string()));
            }
            Ok(vec![format!("/{}", keyword), format!("/{}/:id", keyword)])
        }
    }

    #[tokio::test]
    async fn test_typing_burst_issues_one_lookup() {
        let source = Arc::new(RecordingSource::default());
        let mut fetcher = SuggestionFetcher::new(source.clone(), Duration::from_millis(30));

        fetcher.input("u");
        fetcher.input("us");
        let last = fetcher.input("users").unwrap();
        last.await.unwrap();

        assert_eq!(*source.keywords.lock().unwrap(), vec!["users".to_string()]);
        assert_eq!(fetcher.suggestions(), vec!["/users", "/users/:id"]);
    }

    #[tokio::test]
    async fn test_empty_keyword_clears_immediately() {
        let source = Arc::new(RecordingSource::default());
        let mut fetcher = SuggestionFetcher::new(source.clone(), Duration::from_millis(10));

        fetcher.input("orders").unwrap().await.unwrap();
        assert_eq!(fetcher.suggestions().len(), 2);

        assert!(fetcher.input("  ").is_none());
        assert!(fetcher.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_yields_empty_list() {
        let source = Arc::new(RecordingSource::default());
        let mut fetcher = SuggestionFetcher::new(source, Duration::from_millis(10));
        fetcher.input("boom").unwrap().await.unwrap();
        assert!(fetcher.suggestions().is_empty());
    }
}
