//! Storage module for clone job records
//!
//! This module holds the process-wide job store, including:
//! - The `CloneJob` and `PageRecord` records reported to callers
//! - Status transitions applied to a record in place
//! - Job identifier generation
//! - Retention-based eviction of settled jobs
//!
//! Jobs live in memory only and disappear with the process.

mod memory;
mod traits;

pub use memory::MemoryStorage;
pub use traits::{JobStorage, StorageError, StorageResult};

use crate::state::JobStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cloned document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    /// Public path before finalization, bare filename afterwards
    pub url: String,
    pub filename: String,
}

/// A clone request and its tracked outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneJob {
    pub id: String,
    pub status: JobStatus,
    pub subdomain: String,
    pub original_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub pages: Option<Vec<PageRecord>>,
    pub error: Option<String>,
}

impl CloneJob {
    /// Creates a job in the `processing` status with no pages
    pub fn new(id: String, subdomain: String, original_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: JobStatus::Processing,
            subdomain,
            original_url: Some(original_url),
            created_at,
            pages: None,
            error: None,
        }
    }

    /// Records a successful crawl
    pub fn complete(&mut self, pages: Vec<PageRecord>, original_url: String) -> StorageResult<()> {
        self.transition(JobStatus::Completed)?;
        self.pages = Some(pages);
        self.original_url = Some(original_url);
        Ok(())
    }

    /// Records a failed crawl
    pub fn fail(&mut self, error: String) -> StorageResult<()> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error);
        Ok(())
    }

    /// Marks the job finalized and points every page at its bare filename
    pub fn finalize(&mut self) -> StorageResult<()> {
        self.transition(JobStatus::Finalized)?;
        if let Some(pages) = self.pages.as_mut() {
            for page in pages.iter_mut() {
                page.url = page.filename.clone();
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> StorageResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(StorageError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Generates a job identifier of the form `job_<unix-millis>_<8 hex chars>`
pub fn new_job_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("job_{}_{}", now.timestamp_millis(), &random[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> CloneJob {
        CloneJob::new(
            "job_1_deadbeef".to_string(),
            "example-com-1".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
        )
    }

    fn pages() -> Vec<PageRecord> {
        vec![
            PageRecord {
                title: "Home".to_string(),
                url: "/cloned-sites/example-com-1/index.html".to_string(),
                filename: "index.html".to_string(),
            },
            PageRecord {
                title: "About".to_string(),
                url: "/cloned-sites/example-com-1/_about.html".to_string(),
                filename: "_about.html".to_string(),
            },
        ]
    }

    #[test]
    fn test_new_job_is_processing_without_pages() {
        let job = job();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.pages.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_complete_then_finalize() {
        let mut job = job();
        job.complete(pages(), "https://example.com".to_string()).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.pages.as_ref().unwrap().len(), 2);

        job.finalize().unwrap();
        assert_eq!(job.status, JobStatus::Finalized);
        for page in job.pages.as_ref().unwrap() {
            assert_eq!(page.url, page.filename);
        }
    }

    #[test]
    fn test_fail_records_error() {
        let mut job = job();
        job.fail("navigation failed".to_string()).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("navigation failed"));
        assert!(job.pages.is_none());
    }

    #[test]
    fn test_rejected_transitions_leave_job_untouched() {
        let mut job = job();
        assert!(matches!(
            job.finalize(),
            Err(StorageError::InvalidTransition {
                from: JobStatus::Processing,
                to: JobStatus::Finalized
            })
        ));
        assert_eq!(job.status, JobStatus::Processing);

        job.fail("boom".to_string()).unwrap();
        assert!(job.complete(pages(), "https://example.com".to_string()).is_err());
        assert!(job.pages.is_none());
    }

    #[test]
    fn test_job_id_format() {
        let now = Utc::now();
        let id = new_job_id(now);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "job");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_job_ids_differ() {
        let now = Utc::now();
        assert_ne!(new_job_id(now), new_job_id(now));
    }

    #[test]
    fn test_job_serializes_camel_case() {
        let json = serde_json::to_value(job()).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["originalUrl"], "https://example.com");
        assert!(json.get("createdAt").is_some());
    }
}
