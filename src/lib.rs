//! skillsync - keep skill documents in sync across agent platforms
//!
//! One canonical copy of each skill lives under the canonical folder; every
//! enabled platform holds a pointer-form projection that references it.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod test_utils;

pub use error::{Result, SyncError};
