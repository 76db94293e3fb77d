//! In-memory job store backed by a concurrent map

use crate::storage::{CloneJob, JobStorage, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Process-wide job store
///
/// Contention is per shard of the map; each record is only written by its own
/// pipeline or a single finalize call.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    jobs: DashMap<String, CloneJob>,
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStorage for MemoryStorage {
    fn insert(&self, job: CloneJob) -> StorageResult<()> {
        match self.jobs.entry(job.id.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateJob(job.id)),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    fn get(&self, job_id: &str) -> StorageResult<CloneJob> {
        self.jobs
            .get(job_id)
            .map(|job| job.value().clone())
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }

    fn modify(
        &self,
        job_id: &str,
        update: &mut dyn FnMut(&mut CloneJob) -> StorageResult<()>,
    ) -> StorageResult<CloneJob> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))?;

        let mut updated = entry.value().clone();
        update(&mut updated)?;
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }

    fn evict_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs
            .retain(|_, job| !(job.status.is_settled() && job.created_at < cutoff));
        before.saturating_sub(self.jobs.len())
    }
}
