//! E2E test suite entry point.

mod dependent_workflow;
mod failure_modes;
mod first_sync;
