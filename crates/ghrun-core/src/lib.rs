//! Core domain types and traits for the ghrun workflow run viewer.
//!
//! This crate contains:
//! - Workflow run, job, step and annotation types
//! - Status symbols and the failure-class predicate
//! - Repository references
//! - The Actions API trait consumed by the CLI

pub mod api;
pub mod error;
pub mod repo;
pub mod run;

pub use api::ActionsApi;
pub use error::{Error, Result};
pub use repo::RepoRef;
pub use run::{
    Annotation, AnnotationLevel, Conclusion, Job, Run, Status, Step, Symbol, is_failure_state,
};
