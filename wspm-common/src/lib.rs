//! # WSPM Common Library
//!
//! Shared code for the welfare support plan manager:
//! - Plan record model and edit operations
//! - Versioned migration of stored plan payloads
//! - Key-value persistence port with SQLite and in-memory stores
//! - Plan identifier generation
//! - Configuration loading
//! - Option catalogs used by the editing surface

pub mod catalog;
pub mod config;
pub mod error;
pub mod plan;
pub mod store;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result, ValidationWarning};
pub use plan::PlanRecord;
pub use store::{LoadedPlan, PlanOrigin, PlanStore};
