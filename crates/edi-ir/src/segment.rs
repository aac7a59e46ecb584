//! Segment: a tagged, ordered group of fields

use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named group of fields in parse order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SegmentData")]
pub struct Segment {
    tag: String,
    fields: Vec<Field>,
    /// 0-based index in parse order
    #[serde(default)]
    sequence_number: usize,
    /// 1-based encounter line (0 when unknown)
    #[serde(default)]
    line_number: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

#[derive(Deserialize)]
struct SegmentData {
    tag: String,
    fields: Vec<Field>,
    #[serde(default)]
    sequence_number: usize,
    #[serde(default)]
    line_number: usize,
    #[serde(default)]
    raw: Option<String>,
}

impl TryFrom<SegmentData> for Segment {
    type Error = crate::Error;

    fn try_from(data: SegmentData) -> crate::Result<Self> {
        let mut segment = Self::new(data.tag, data.fields)?
            .with_sequence_number(data.sequence_number)
            .with_line_number(data.line_number);
        segment.raw = data.raw;
        Ok(segment)
    }
}

impl Segment {
    /// Create a segment with the given tag and fields
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BlankTag`] if `tag` is empty or whitespace.
    pub fn new(tag: impl Into<String>, fields: Vec<Field>) -> crate::Result<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(crate::Error::BlankTag);
        }
        Ok(Self {
            tag,
            fields,
            sequence_number: 0,
            line_number: 0,
            raw: None,
        })
    }

    /// Copy with a different parse-order index
    #[must_use]
    pub fn with_sequence_number(mut self, sequence_number: usize) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Copy with a source line number
    #[must_use]
    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = line_number;
        self
    }

    /// Copy keeping the raw segment text
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Copy with an additional trailing field
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Segment tag (e.g. `BGM`, `NAD`, `ST`, or an XML element name)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All fields in parse order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Raw text this segment was tokenized from, if kept
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// First field whose position matches exactly
    pub fn field_by_position(&self, position: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.position() == position)
    }

    /// First field carrying the given name
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == Some(name))
    }

    /// Value of the field at `position`
    pub fn field_value(&self, position: &str) -> Option<&str> {
        self.field_by_position(position).map(Field::value)
    }

    pub fn has_field(&self, position: &str) -> bool {
        self.field_by_position(position).is_some()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.fields == other.fields
    }
}

impl Eq for Segment {}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} fields", self.tag, self.fields.len())?;
        if self.line_number > 0 {
            write!(f, ", line {}", self.line_number)?;
        }
        write!(f, ")")
    }
}
