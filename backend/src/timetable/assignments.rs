//! Where slot assignments come from.
//!
//! The server's `block_assignments` is authoritative. The on-disk cache only
//! answers for plans whose detail carries no assignments, and it is
//! overwritten with the server copy whenever one is seen.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::models::assignment::AssignmentMap;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Server,
    Cache,
    None,
}

pub fn cache_key(plan_id: i64) -> String {
    format!("timetable:blockAssign:{plan_id}")
}

/// Offline copy of assignment maps, one JSON file per plan.
#[derive(Debug, Clone, Default)]
pub struct AssignmentCache {
    dir: Option<PathBuf>,
}

impl AssignmentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn path_for(&self, plan_id: i64) -> Option<PathBuf> {
        let file = format!("{}.json", cache_key(plan_id).replace(':', "_"));
        self.dir.as_ref().map(|d| d.join(file))
    }

    /// Cached map for a plan. Missing entries and unreadable JSON read as empty.
    pub async fn read(&self, plan_id: i64) -> AssignmentMap {
        let Some(path) = self.path_for(plan_id) else {
            return AssignmentMap::new();
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AssignmentMap::new(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                return AssignmentMap::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(entries) => AssignmentMap::from_wire_entries(entries),
            Err(e) => {
                tracing::warn!("Ignoring malformed cache entry {}: {}", cache_key(plan_id), e);
                AssignmentMap::new()
            }
        }
    }

    /// Replaces the cached map for a plan. Each write goes to its own temp
    /// file and is renamed into place, so readers never see a partial entry
    /// and concurrent writers end with one complete copy.
    pub async fn write(&self, plan_id: i64, map: &AssignmentMap) -> anyhow::Result<()> {
        let Some(path) = self.path_for(plan_id) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, serde_json::to_vec(map)?).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Picks the assignment map for a plan: the server copy when present
/// (refreshing the cache with it when it differs), otherwise the cached one.
pub async fn load_assignments(
    plan_id: i64,
    server: Option<AssignmentMap>,
    cache: &AssignmentCache,
) -> (AssignmentMap, AssignmentSource) {
    if let Some(map) = server {
        if cache.dir().is_some() && cache.read(plan_id).await != map {
            if let Err(e) = cache.write(plan_id, &map).await {
                tracing::warn!("Could not refresh cache for plan {}: {}", plan_id, e);
            }
        }
        return (map, AssignmentSource::Server);
    }

    if cache.dir().is_none() {
        return (AssignmentMap::new(), AssignmentSource::None);
    }

    let cached = cache.read(plan_id).await;
    if cached.is_empty() {
        (cached, AssignmentSource::None)
    } else {
        tracing::debug!("Using cached assignments for plan {}", plan_id);
        (cached, AssignmentSource::Cache)
    }
}
