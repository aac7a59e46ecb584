#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // Builder constructors read clearly without #[must_use].

//! # edi-rules
//!
//! Declarative comparison rules for parsed EDI messages.
//!
//! A [`RuleSet`] lists, per segment tag, how many occurrences are allowed
//! and which fields must match what. Rule sets are plain data: they are
//! loaded from YAML or JSON by [`RuleLoader`] and read by the comparison
//! engine without modification.

pub mod loader;
pub mod model;
pub mod source;

pub use loader::RuleLoader;
pub use model::{ComparisonRule, FieldRule, RuleSet, ValidationType};
pub use source::SourceRef;

use thiserror::Error;

/// Rule-definition errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Rule file not found: {0}")]
    NotFound(String),

    #[error("Invalid rule format: {0}")]
    InvalidFormat(String),

    #[error("Invalid rule definition: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, Error>;
