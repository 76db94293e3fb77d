//! Storage traits and error types
//!
//! This module defines the trait interface for job store backends and
//! associated error types.

use crate::state::JobStatus;
use crate::storage::{CloneJob, PageRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job already exists: {0}")]
    DuplicateJob(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// Implementations must be safe to share between the pipeline tasks and the
/// status/finalize callers; every method takes `&self`.
pub trait JobStorage: Send + Sync {
    // ===== Job Management =====

    /// Inserts a new job
    ///
    /// # Errors
    ///
    /// * `StorageError::DuplicateJob` - a job with the same id exists
    fn insert(&self, job: CloneJob) -> StorageResult<()>;

    /// Returns a snapshot of a job
    fn get(&self, job_id: &str) -> StorageResult<CloneJob>;

    /// Applies `update` to a job and returns the updated snapshot
    ///
    /// The update runs against a copy; if it returns an error the stored
    /// record is left unchanged.
    fn modify(
        &self,
        job_id: &str,
        update: &mut dyn FnMut(&mut CloneJob) -> StorageResult<()>,
    ) -> StorageResult<CloneJob>;

    /// Number of jobs currently stored
    fn len(&self) -> usize;

    /// Returns true if the store holds no jobs
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ===== Retention =====

    /// Removes settled jobs created before `cutoff`
    ///
    /// Jobs still `processing` are never removed.
    ///
    /// # Returns
    ///
    /// The number of jobs removed
    fn evict_before(&self, cutoff: DateTime<Utc>) -> usize;

    // ===== Transitions =====

    /// `processing -> completed`, attaching pages and the original URL
    fn complete_job(
        &self,
        job_id: &str,
        pages: Vec<PageRecord>,
        original_url: &str,
    ) -> StorageResult<CloneJob> {
        let mut pages = Some(pages);
        self.modify(job_id, &mut |job| {
            job.complete(pages.take().unwrap_or_default(), original_url.to_string())
        })
    }

    /// `processing -> failed`, recording the error message
    fn fail_job(&self, job_id: &str, error: &str) -> StorageResult<CloneJob> {
        self.modify(job_id, &mut |job| job.fail(error.to_string()))
    }

    /// `completed -> finalized`
    fn finalize_job(&self, job_id: &str) -> StorageResult<CloneJob> {
        self.modify(job_id, &mut |job| job.finalize())
    }
}
