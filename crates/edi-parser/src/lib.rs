#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // Parser constructors and predicates read clearly without #[must_use].

//! # edi-parser
//!
//! Format tokenizers for EDIFACT, ANSI X12 and XML.
//!
//! Every parser turns raw text into the uniform [`edi_ir::Message`] model.
//! Parsers are stateless: one instance can be shared across threads and
//! each call works on its own input only. Malformed input is reported as a
//! [`ParseError`]; nothing is repaired.

pub mod detect;
pub mod edifact;
pub mod syntax;
pub mod x12;
pub mod xml;

pub use detect::{detect_format, parse_auto, parse_path, parser_for};
pub use edifact::EdifactParser;
pub use x12::AnsiX12Parser;
pub use xml::XmlParser;

use edi_ir::{FileFormat, Message};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning raw text into a [`Message`]
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("No valid segments found in content")]
    NoSegments,

    #[error("Unable to detect message format")]
    UnknownFormat,

    #[error("{reason} (at line {line}): {preview}")]
    Segment {
        line: usize,
        preview: String,
        reason: String,
    },

    #[error("Invalid XML (at line {line}): {reason}")]
    Xml {
        line: usize,
        reason: String,
        preview: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] edi_ir::Error),
}

impl ParseError {
    /// Source line the error refers to, when known
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Segment { line, .. } | Self::Xml { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Truncated excerpt of the offending content, when known
    pub fn content_preview(&self) -> Option<&str> {
        match self {
            Self::Segment { preview, .. } | Self::Xml { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub(crate) fn segment(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::Segment {
            line,
            preview: syntax::preview(content),
            reason: reason.into(),
        }
    }
}

/// Result type for parse operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// A tokenizer for one wire format
pub trait FormatParser: Send + Sync {
    /// Format produced by this parser
    fn format(&self) -> FileFormat;

    /// Parse a complete message held in memory
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for empty, malformed or segment-less input.
    fn parse(&self, content: &str) -> Result<Message>;

    /// Cheap heuristic on whether `content` looks like this parser's format
    fn can_parse(&self, content: &str) -> bool;

    /// Read and parse a file, recording its path as the message source
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] when the file cannot be read, otherwise the
    /// errors of [`FormatParser::parse`].
    fn parse_file(&self, path: &Path) -> Result<Message> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let message = self.parse(&content)?;
        Ok(message.with_source(path.display().to_string()))
    }

    /// Drain `reader` and parse its content
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] when the stream cannot be read as UTF-8,
    /// otherwise the errors of [`FormatParser::parse`].
    fn parse_reader(&self, reader: &mut dyn Read) -> Result<Message> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| ParseError::Io {
                path: "input stream".to_string(),
                source,
            })?;
        self.parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_formatting() {
        let err = ParseError::segment(5, "BGM+INVALID", "Invalid segment tag");
        assert_eq!(err.line_number(), Some(5));
        assert_eq!(err.content_preview(), Some("BGM+INVALID"));

        let message = err.to_string();
        assert!(message.contains("line 5"));
        assert!(message.contains("BGM+INVALID"));
    }

    #[test]
    fn test_segment_error_preview_truncated() {
        let long = format!("FTX+AAI+++{}", "A".repeat(80));
        let err = ParseError::segment(1, &long, "Invalid segment tag");
        let preview = err.content_preview().unwrap();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), syntax::PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_errors_without_location() {
        assert_eq!(ParseError::EmptyContent.line_number(), None);
        assert_eq!(ParseError::NoSegments.content_preview(), None);
    }
}
