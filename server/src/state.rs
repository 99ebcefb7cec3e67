use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use guildinfo_shared::ErrorKind;
use tracing::warn;

use crate::config::{
    UpstreamConfig, sse_broadcast_buffer, upstream_connect_timeout, upstream_http_timeout,
};
use crate::controller::SearchController;
use crate::services::gameinfo::GameInfoClient;

#[derive(Clone)]
pub struct AppState {
    pub controller: SearchController,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    searches_started_total: AtomicU64,
    searches_succeeded_total: AtomicU64,
    searches_not_found_total: AtomicU64,
    searches_transport_errors_total: AtomicU64,
    searches_ignored_total: AtomicU64,
    searches_superseded_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilitySnapshot {
    pub searches_started_total: u64,
    pub searches_succeeded_total: u64,
    pub searches_not_found_total: u64,
    pub searches_transport_errors_total: u64,
    pub searches_ignored_total: u64,
    pub searches_superseded_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            searches_started_total: self.searches_started_total.load(Ordering::Relaxed),
            searches_succeeded_total: self.searches_succeeded_total.load(Ordering::Relaxed),
            searches_not_found_total: self.searches_not_found_total.load(Ordering::Relaxed),
            searches_transport_errors_total: self
                .searches_transport_errors_total
                .load(Ordering::Relaxed),
            searches_ignored_total: self.searches_ignored_total.load(Ordering::Relaxed),
            searches_superseded_total: self.searches_superseded_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_search_started(&self) {
        self.searches_started_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_succeeded(&self) {
        self.searches_succeeded_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_failed(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::NotFound => &self.searches_not_found_total,
            ErrorKind::TransportError => &self.searches_transport_errors_total,
            ErrorKind::EmptyInput => &self.searches_ignored_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_ignored(&self) {
        self.searches_ignored_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_superseded(&self) {
        self.searches_superseded_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(upstream: UpstreamConfig) -> Self {
        let http_client = build_http_client();
        Self::with_http_client(http_client, upstream)
    }

    fn with_http_client(http_client: reqwest::Client, upstream: UpstreamConfig) -> Self {
        let observability = Arc::new(ObservabilityCounters::default());
        let controller = SearchController::new(
            GameInfoClient::new(http_client, upstream),
            Arc::clone(&observability),
            sse_broadcast_buffer(),
        );
        Self {
            controller,
            observability,
        }
    }
}

fn build_http_client() -> reqwest::Client {
    let connect_timeout = upstream_connect_timeout();
    let request_timeout = upstream_http_timeout();
    let builder = || {
        let builder = reqwest::Client::builder().connect_timeout(connect_timeout);
        match request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    };
    builder()
        .user_agent("guildinfo/0.1")
        .build()
        .unwrap_or_else(|e| {
            warn!(
                error = %e,
                "failed to build configured HTTP client, retrying without custom user-agent"
            );
            builder().build().unwrap_or_else(|e| {
                warn!(error = %e, "failed to build timeout-configured HTTP client, using defaults");
                reqwest::Client::new()
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_land_in_their_own_counters() {
        let counters = ObservabilityCounters::default();
        counters.record_search_started();
        counters.record_search_started();
        counters.record_search_failed(ErrorKind::NotFound);
        counters.record_search_failed(ErrorKind::TransportError);
        counters.record_search_ignored();
        counters.record_search_superseded();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.searches_started_total, 2);
        assert_eq!(snapshot.searches_succeeded_total, 0);
        assert_eq!(snapshot.searches_not_found_total, 1);
        assert_eq!(snapshot.searches_transport_errors_total, 1);
        assert_eq!(snapshot.searches_ignored_total, 1);
        assert_eq!(snapshot.searches_superseded_total, 1);
    }
}
