//! Recorded discrepancies between rules and a parsed message

use serde::Serialize;
use std::fmt;

/// Category of a [`Difference`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceType {
    ValueMismatch,
    MissingField,
    MissingSegment,
    UnexpectedSegment,
    PatternMismatch,
    DateFormatInvalid,
    SegmentCountMismatch,
    SegmentOrderMismatch,
    CustomValidationFailed,
}

impl DifferenceType {
    /// Stable upper-case name used in reports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValueMismatch => "VALUE_MISMATCH",
            Self::MissingField => "MISSING_FIELD",
            Self::MissingSegment => "MISSING_SEGMENT",
            Self::UnexpectedSegment => "UNEXPECTED_SEGMENT",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::DateFormatInvalid => "DATE_FORMAT_INVALID",
            Self::SegmentCountMismatch => "SEGMENT_COUNT_MISMATCH",
            Self::SegmentOrderMismatch => "SEGMENT_ORDER_MISMATCH",
            Self::CustomValidationFailed => "CUSTOM_VALIDATION_FAILED",
        }
    }
}

impl fmt::Display for DifferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deviation between an expectation and the actual message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    #[serde(rename = "type")]
    pub kind: DifferenceType,
    pub segment_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// Line of the offending segment, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Difference {
    pub fn new(kind: DifferenceType, segment_tag: impl Into<String>) -> Self {
        Self {
            kind,
            segment_tag: segment_tag.into(),
            field_position: None,
            field_name: None,
            expected: None,
            actual: None,
            line_number: None,
            description: None,
        }
    }

    /// Attach the field this difference is about
    #[must_use]
    pub fn with_field(mut self, position: impl Into<String>, name: Option<&str>) -> Self {
        self.field_position = Some(position.into());
        self.field_name = name.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    #[must_use]
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Attach a source line; `0` means unknown and is ignored
    #[must_use]
    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = (line_number > 0).then_some(line_number);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        match &self.field_position {
            Some(position) => f.write_str(position)?,
            None => f.write_str(&self.segment_tag)?,
        }
        if let Some(name) = &self.field_name {
            write!(f, " ({name})")?;
        }
        if let Some(line) = self.line_number {
            write!(f, " at line {line}")?;
        }
        match &self.description {
            Some(description) => write!(f, ": {description}"),
            None => write!(
                f,
                ": Expected '{}' but got '{}'",
                self.expected.as_deref().unwrap_or_default(),
                self.actual.as_deref().unwrap_or_default()
            ),
        }
    }
}
