//! State module for tracking clone job progress
//!
//! This module provides the job lifecycle state machine.
//!
//! # Components
//!
//! - `JobStatus`: The status of a clone job (processing, completed, finalized, failed)
//!   and the transitions allowed between them

mod job_state;

// Re-export main types
pub use job_state::JobStatus;
