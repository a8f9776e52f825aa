//! Typed client for the school REST API.
//!
//! Every list endpoint goes through [`UpstreamClient::fetch_all_pages`], and
//! every record is normalized into its canonical model right here so nothing
//! downstream sees alternate field names.

pub mod error;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use serde::de::DeserializeOwned;

pub use error::FetchError;

use crate::models::{
    common::Page,
    roster::{Class, ClassSubjectTeacher, RawClass, RawClassSubjectTeacher, RawTeacher, TeacherDetail},
    timetable::{Period, PlanDetail, RawPeriod, RawPlan, RawTemplate, TimetablePlan, TimetableTemplate},
};

pub const DEFAULT_MAX_PAGES: usize = 50;

#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    max_pages: usize,
    token: Option<Arc<str>>,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration, max_pages: usize) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            anyhow::bail!("upstream base URL must not be empty");
        }
        reqwest::Url::parse(base_url).context("upstream base URL is not a valid URL")?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            max_pages: max_pages.max(1),
            token: None,
        })
    }

    /// Same client, sending `Authorization: Bearer <token>` upstream.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
            ..self.clone()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Reads every page of a list endpoint. Accepts bare arrays and
    /// `{results, next}` pages; follows `next` for at most `max_pages` pages
    /// and returns whatever was collected once the cap is hit.
    pub async fn fetch_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        let mut items = Vec::new();
        let mut url = self.url(path);

        for page in 1..=self.max_pages {
            let (mut batch, next) = self.get_json::<Page<T>>(&url).await?.into_parts();
            items.append(&mut batch);

            let Some(next) = next else {
                return Ok(items);
            };
            if page == self.max_pages {
                tracing::warn!(
                    "Pagination for {} stopped after {} pages with more remaining",
                    path,
                    self.max_pages
                );
                break;
            }
            url = resolve_link(&url, &next)?;
        }

        Ok(items)
    }

    // -- Timetable --

    pub async fn list_plans(&self) -> Result<Vec<TimetablePlan>, FetchError> {
        let raw: Vec<RawPlan> = self.fetch_all_pages("/academics/timetable/plans/").await?;
        Ok(raw.into_iter().map(TimetablePlan::from).collect())
    }

    pub async fn get_plan(&self, id: i64) -> Result<PlanDetail, FetchError> {
        let raw: RawPlan = self
            .get_json(&self.url(&format!("/academics/timetable/plans/{id}/")))
            .await?;
        Ok(PlanDetail::from(raw))
    }

    pub async fn get_template(&self, id: i64) -> Result<TimetableTemplate, FetchError> {
        let raw: RawTemplate = self
            .get_json(&self.url(&format!("/academics/timetable/templates/{id}/")))
            .await?;
        Ok(TimetableTemplate::from(raw))
    }

    /// Periods of a template, ascending by `period_index`. When an index is
    /// repeated the first one returned wins.
    pub async fn list_periods(&self, template_id: i64) -> Result<Vec<Period>, FetchError> {
        let raw: Vec<RawPeriod> = self
            .fetch_all_pages(&format!("/academics/timetable/periods/?template={template_id}"))
            .await?;
        let received = raw.len();
        let mut periods: Vec<Period> = raw.into_iter().filter_map(RawPeriod::normalize).collect();
        if periods.len() != received {
            tracing::warn!(
                "Dropped {} period(s) of template {} without an index or readable times",
                received - periods.len(),
                template_id
            );
        }
        periods.sort_by_key(|p| p.period_index);
        periods.dedup_by_key(|p| p.period_index);
        Ok(periods)
    }

    // -- Roster --

    pub async fn list_classes(&self) -> Result<Vec<Class>, FetchError> {
        let raw: Vec<RawClass> = self.fetch_all_pages("/academics/classes/").await?;
        Ok(raw.into_iter().map(Class::from).collect())
    }

    pub async fn get_class(&self, id: i64) -> Result<Class, FetchError> {
        let raw: RawClass = self
            .get_json(&self.url(&format!("/academics/classes/{id}/")))
            .await?;
        Ok(Class::from(raw))
    }

    pub async fn list_class_subject_teachers(
        &self,
        class_id: i64,
    ) -> Result<Vec<ClassSubjectTeacher>, FetchError> {
        let raw: Vec<RawClassSubjectTeacher> = self
            .fetch_all_pages(&format!("/academics/class_subject_teachers/?klass={class_id}"))
            .await?;
        Ok(raw.into_iter().map(ClassSubjectTeacher::from).collect())
    }

    pub async fn list_teachers(&self) -> Result<Vec<TeacherDetail>, FetchError> {
        let raw: Vec<RawTeacher> = self.fetch_all_pages("/academics/teachers/").await?;
        Ok(raw.into_iter().map(TeacherDetail::from).collect())
    }
}

fn resolve_link(current: &str, next: &str) -> Result<String, FetchError> {
    reqwest::Url::parse(current)
        .and_then(|base| base.join(next))
        .map(String::from)
        .map_err(|_| FetchError::BadLink {
            link: next.to_string(),
        })
}
