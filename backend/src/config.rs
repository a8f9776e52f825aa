use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use chrono_tz::Tz;

use crate::upstream::DEFAULT_MAX_PAGES;

#[derive(Clone, Debug)]
pub struct Config {
    pub upstream_base_url: String,
    pub upstream_timeout: Duration,
    pub upstream_max_pages: usize,
    pub listen_addr: String,
    pub cors_origins: Vec<String>,
    pub school_timezone: Tz,
    pub period_refresh: Duration,
    pub assignment_cache_dir: Option<PathBuf>,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let upstream_base_url =
            std::env::var("UPSTREAM_BASE_URL").context("UPSTREAM_BASE_URL must be set")?;
        if upstream_base_url.trim().is_empty() {
            anyhow::bail!("UPSTREAM_BASE_URL must not be empty");
        }

        let timeout_secs: u64 = var_or("UPSTREAM_TIMEOUT_SECS", "10")
            .parse()
            .context("UPSTREAM_TIMEOUT_SECS must be a number")?;
        let max_pages: usize = var_or("UPSTREAM_MAX_PAGES", &DEFAULT_MAX_PAGES.to_string())
            .parse()
            .context("UPSTREAM_MAX_PAGES must be a number")?;
        if max_pages == 0 {
            anyhow::bail!("UPSTREAM_MAX_PAGES must be at least 1");
        }
        let refresh_secs: u64 = var_or("PERIOD_REFRESH_SECS", "30")
            .parse()
            .context("PERIOD_REFRESH_SECS must be a number")?;
        if refresh_secs == 0 {
            anyhow::bail!("PERIOD_REFRESH_SECS must be at least 1");
        }

        let tz_name = var_or("SCHOOL_TIMEZONE", "UTC");
        let school_timezone: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("SCHOOL_TIMEZONE {:?} is not a known zone: {}", tz_name, e))?;

        Ok(Self {
            upstream_base_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            upstream_max_pages: max_pages,
            listen_addr: var_or("LISTEN_ADDR", "0.0.0.0:8080"),
            cors_origins: var_or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            school_timezone,
            period_refresh: Duration::from_secs(refresh_secs),
            assignment_cache_dir: std::env::var("ASSIGNMENT_CACHE_DIR")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
