//! Core skill types: head documents, field categories, fingerprints and pointers.

pub mod dependent;
pub mod document;
pub mod fields;
pub mod hash;
pub mod pointer;

pub use dependent::{DependentFile, HOUSEKEEPING_DIRS};
pub use document::{Document, DocumentForm, HEAD_DOCUMENT, bodies_equal};
pub use fields::{BOOKKEEPING_FIELD, FIELD_TABLE, MergeStrategy, SCHEMA_VERSION};
pub use hash::{compute_hash, hash_bytes};
pub use pointer::{POINTER_MARKER, build_pointer, resolve_pointer};
