//! Service layer exposing the three clone operations
//!
//! [`SiteCloner`] is the boundary a transport (HTTP handler, CLI) calls into:
//! - `start_clone` validates the URL, registers a job and spawns its pipeline
//! - `job_status` reports the current state of a job
//! - `finalize` converts a completed clone to directory-relative references
//!
//! Results are plain serializable reports; errors are [`CloneError`] values
//! whose variants map onto the usual status codes (validation 400, not found
//! 404, invalid state 400).

use crate::config::{validate, Config};
use crate::crawler::{build_http_client, default_launcher, BrowserLauncher, CloneRequest, Coordinator, HOME_FILENAME};
use crate::output::{finalize_site, SiteLayout};
use crate::state::JobStatus;
use crate::storage::{new_job_id, CloneJob, JobStorage, MemoryStorage, PageRecord, StorageError};
use crate::url::{derive_subdomain, parse_http_url};
use crate::{CloneError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Rough duration reported to callers when a clone starts
pub const ESTIMATED_TIME: &str = "5-15 minutes";

/// Response to an accepted clone request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneAccepted {
    pub job_id: String,
    pub subdomain: String,
    pub status: JobStatus,
    pub estimated_time: String,
}

/// Snapshot of a job as reported to callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub job_id: String,
    pub status: JobStatus,
    pub subdomain: String,
    /// Public path of the cloned home page, once the crawl completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response to a successful finalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeReport {
    pub success: bool,
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
}

/// Entry point for starting, querying and finalizing clone jobs
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct SiteCloner {
    config: Arc<Config>,
    store: Arc<dyn JobStorage>,
    coordinator: Arc<Coordinator>,
}

impl SiteCloner {
    /// Creates a cloner with the launcher selected by the configuration
    ///
    /// # Errors
    ///
    /// * `CloneError::Config` - the configuration failed validation
    /// * `CloneError::Http` - the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let client = build_http_client(&config.http)?;
        let launcher = default_launcher(&config, client.clone());
        Self::with_parts(config, client, launcher, Arc::new(MemoryStorage::new()))
    }

    /// Creates a cloner that renders pages through `launcher`
    pub fn with_launcher(config: Config, launcher: Arc<dyn BrowserLauncher>) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        Self::with_parts(config, client, launcher, Arc::new(MemoryStorage::new()))
    }

    /// Creates a cloner from explicit collaborators
    ///
    /// # Errors
    ///
    /// * `CloneError::Config` - the configuration failed validation
    pub fn with_parts(
        config: Config,
        client: reqwest::Client,
        launcher: Arc<dyn BrowserLauncher>,
        store: Arc<dyn JobStorage>,
    ) -> Result<Self> {
        validate(&config)?;
        let config = Arc::new(config);
        let coordinator = Coordinator::new(Arc::clone(&config), client, launcher)?;
        Ok(Self {
            config,
            store,
            coordinator: Arc::new(coordinator),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn JobStorage {
        &*self.store
    }

    /// Accepts a clone request and starts its pipeline in the background
    ///
    /// Must be called from within a tokio runtime. Settled jobs older than
    /// the retention window are evicted first.
    ///
    /// # Errors
    ///
    /// * `CloneError::Validation` - `raw_url` is empty or not an absolute
    ///   http(s) URL; no job is created
    pub async fn start_clone(&self, raw_url: &str) -> Result<CloneAccepted> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(CloneError::Validation("URL is required".to_string()));
        }
        let url = parse_http_url(trimmed)
            .map_err(|e| CloneError::Validation(format!("Invalid URL '{}': {}", trimmed, e)))?;

        let now = Utc::now();
        self.evict_expired(now);

        let job_id = new_job_id(now);
        let subdomain = derive_subdomain(trimmed, now.timestamp_millis());
        self.store.insert(CloneJob::new(
            job_id.clone(),
            subdomain.clone(),
            trimmed.to_string(),
            now,
        ))?;

        tracing::info!(job_id = %job_id, subdomain = %subdomain, url = %url, "Clone job accepted");

        let request = CloneRequest {
            job_id: job_id.clone(),
            raw_url: trimmed.to_string(),
            url,
            subdomain: subdomain.clone(),
        };
        let coordinator = Arc::clone(&self.coordinator);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            coordinator.execute(&*store, &request).await;
        });

        Ok(CloneAccepted {
            job_id,
            subdomain,
            status: JobStatus::Processing,
            estimated_time: ESTIMATED_TIME.to_string(),
        })
    }

    /// Reports the current state of a job
    ///
    /// # Errors
    ///
    /// * `CloneError::NotFound` - unknown job id
    pub fn job_status(&self, job_id: &str) -> Result<JobStatusReport> {
        let job = self.store.get(job_id).map_err(|e| storage_error(job_id, e))?;
        Ok(self.report(job))
    }

    /// Rewrites a completed clone to directory-relative references
    ///
    /// # Errors
    ///
    /// * `CloneError::NotFound` - unknown job id, or the output directory is gone
    /// * `CloneError::InvalidState` - the job is not `completed`
    /// * `CloneError::Io` - a document could not be read or written
    pub async fn finalize(&self, job_id: &str) -> Result<FinalizeReport> {
        let job = self.store.get(job_id).map_err(|e| storage_error(job_id, e))?;
        if job.status != JobStatus::Completed {
            return Err(CloneError::InvalidState {
                job_id: job.id,
                status: job.status,
            });
        }

        let layout = SiteLayout::new(&self.config.output, &job.subdomain);
        let stats = finalize_site(&layout).await?;
        self.store
            .finalize_job(job_id)
            .map_err(|e| storage_error(job_id, e))?;

        tracing::info!(
            job_id,
            stage = "finalize",
            files_rewritten = stats.files_rewritten,
            references = stats.references,
            "Clone finalized"
        );

        Ok(FinalizeReport {
            success: true,
            job_id: job_id.to_string(),
            status: JobStatus::Finalized,
            message: format!(
                "Rewrote {} references in {} of {} files",
                stats.references, stats.files_rewritten, stats.files_scanned
            ),
        })
    }

    /// Polls a job until it leaves `processing`
    pub async fn wait_for_settled(&self, job_id: &str, poll: Duration) -> Result<JobStatusReport> {
        loop {
            let report = self.job_status(job_id)?;
            if report.status.is_settled() {
                return Ok(report);
            }
            tokio::time::sleep(poll).await;
        }
    }

    fn evict_expired(&self, now: DateTime<Utc>) {
        let Ok(retention) = chrono::Duration::from_std(self.config.jobs.retention()) else {
            return;
        };
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return;
        };

        let evicted = self.store.evict_before(cutoff);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired jobs");
        }
    }

    fn report(&self, job: CloneJob) -> JobStatusReport {
        let url = job.status.has_output().then(|| {
            SiteLayout::new(&self.config.output, &job.subdomain).public_path(HOME_FILENAME)
        });

        JobStatusReport {
            job_id: job.id,
            status: job.status,
            subdomain: job.subdomain,
            url,
            original_url: job.original_url,
            pages: job.pages,
            error: job.error,
            created_at: job.created_at,
        }
    }
}

fn storage_error(job_id: &str, error: StorageError) -> CloneError {
    match error {
        StorageError::JobNotFound(id) => CloneError::NotFound(format!("Job {}", id)),
        StorageError::InvalidTransition { from, .. } => CloneError::InvalidState {
            job_id: job_id.to_string(),
            status: from,
        },
        other => CloneError::Storage(other),
    }
}
