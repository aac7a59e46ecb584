#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // Accessors read clearly at call sites without #[must_use].

//! # edi-ir
//!
//! Uniform message model shared by every supported format.
//!
//! EDIFACT, ANSI X12 and XML documents are all normalized into the same
//! tree: a [`Message`] owns an ordered list of [`Segment`]s, and each segment
//! owns an ordered list of [`Field`]s addressed by dotted position paths.
//! Instances are built once by a parser and never mutated; the `with_*`
//! helpers return modified copies.

/// Individual addressable values.
pub mod field;
/// Supported wire formats and their delimiters.
pub mod format;
/// Whole messages with tag-indexed lookup.
pub mod message;
/// Tagged groups of fields.
pub mod segment;

pub use field::Field;
pub use format::FileFormat;
pub use message::Message;
pub use segment::Segment;

use thiserror::Error;

/// Errors raised while constructing model values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Field position must not be blank")]
    BlankPosition,

    #[error("Segment tag must not be blank")]
    BlankTag,
}

/// Crate-local result type for model construction.
pub type Result<T> = std::result::Result<T, Error>;
