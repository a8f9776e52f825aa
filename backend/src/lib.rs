pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod timetable;
pub mod upstream;

use std::{sync::Arc, time::Duration};

use timetable::{
    assignments::AssignmentCache,
    clock::{Clock, SystemClock},
};
use upstream::UpstreamClient;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub cache: AssignmentCache,
    pub clock: Arc<dyn Clock>,
    pub period_refresh: Duration,
}

impl AppState {
    pub fn from_config(cfg: &config::Config) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(
            &cfg.upstream_base_url,
            cfg.upstream_timeout,
            cfg.upstream_max_pages,
        )?;
        let cache = match &cfg.assignment_cache_dir {
            Some(dir) => AssignmentCache::new(dir),
            None => AssignmentCache::disabled(),
        };
        Ok(Self {
            upstream,
            cache,
            clock: Arc::new(SystemClock::new(cfg.school_timezone)),
            period_refresh: cfg.period_refresh,
        })
    }
}

impl axum::extract::FromRef<AppState> for UpstreamClient {
    fn from_ref(state: &AppState) -> Self {
        state.upstream.clone()
    }
}
