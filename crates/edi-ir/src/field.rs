//! Field: the smallest addressable datum of a message

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value addressed by a dotted position path
///
/// Positions look like `BGM.0001` for simple elements, `NAD.C001.0002` for
/// components of a composite, or `Party.ID` / `Party[@type]` for XML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FieldData")]
pub struct Field {
    position: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    line_number: usize,
}

#[derive(Deserialize)]
struct FieldData {
    position: String,
    value: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    line_number: usize,
}

impl TryFrom<FieldData> for Field {
    type Error = crate::Error;

    fn try_from(data: FieldData) -> crate::Result<Self> {
        let mut field = Self::new(data.position, data.value)?.with_line_number(data.line_number);
        field.name = data.name;
        Ok(field)
    }
}

impl Field {
    /// Create a field at `position` holding `value`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BlankPosition`] if `position` is empty or whitespace.
    pub fn new(position: impl Into<String>, value: impl Into<String>) -> crate::Result<Self> {
        let position = position.into();
        if position.trim().is_empty() {
            return Err(crate::Error::BlankPosition);
        }
        Ok(Self {
            position,
            value: value.into(),
            name: None,
            line_number: 0,
        })
    }

    /// Copy of this field carrying a human-readable name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Copy of this field carrying a source line number
    #[must_use]
    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = line_number;
        self
    }

    /// Dotted position path
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Field value (possibly empty)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Optional descriptive name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Source line (0 when unknown)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Whether the value is non-blank
    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

// Names and line numbers are presentation details; two fields with the same
// address and value are the same datum.
impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.value == other.value
    }
}

impl Eq for Field {}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.position, self.value)
    }
}
