//! # Terms Common Library
//!
//! Shared code for the terms tooling:
//! - Term record model and document key derivation
//! - Shape, batch and uniqueness validators
//! - Remote conflict detection and the seed/append write orchestrator
//! - Document store trait with SQLite and in-memory implementations
//! - Logger collaborator used for validation diagnostics
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logger;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod uuid_utils;
pub mod validation;

pub use error::{Error, Result};
pub use logger::TermsLogger;
pub use model::{snake_case, Conflict, TermRecord, TermsDocument};
pub use reconcile::{SeedMode, TermsRepository};
pub use store::DocumentStore;
