//! Integration tests for the clone pipeline
//!
//! These tests use wiremock to serve small sites and drive the whole
//! start/status/finalize cycle with the plain HTTP renderer, writing into
//! temporary output roots.

mod common;

mod clone_tests;
mod finalize_tests;
