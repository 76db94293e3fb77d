/// Job status definitions for tracking clone progress
///
/// A job moves `processing -> completed -> finalized`, or `processing -> failed`.
/// Statuses never move backwards.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current status of a clone job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    // ===== Active States =====
    /// The crawl pipeline is running
    Processing,

    // ===== Intermediate States =====
    /// The crawl finished and documents are on disk with site-absolute paths
    Completed,

    // ===== Terminal States =====
    /// Documents were rewritten to directory-relative paths
    Finalized,

    /// The crawl failed; partial output may remain on disk
    Failed,
}

impl JobStatus {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    /// Returns true once the crawl phase has ended, successfully or not
    ///
    /// Only jobs past the crawl phase are eligible for retention eviction.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// Returns true if the job produced output documents
    pub fn has_output(&self) -> bool {
        matches!(self, Self::Completed | Self::Finalized)
    }

    /// Returns true if moving from `self` to `next` is a valid transition
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Completed, Self::Finalized)
        )
    }

    /// Lower-case name used in reports and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible statuses
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Processing,
            Self::Completed,
            Self::Finalized,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
