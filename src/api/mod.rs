//! Shared API plumbing.

pub mod common;
