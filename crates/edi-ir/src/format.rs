//! Supported message formats

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format of a parsed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    /// UN/EDIFACT (segment `'`, element `+`, component `:`)
    Edifact,

    /// ANSI ASC X12 (segment `~`, element `*`, component `:` or `>`)
    AnsiX12,

    /// XML documents mapped element-per-segment
    Xml,
}

impl FileFormat {
    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Edifact => "EDIFACT",
            Self::AnsiX12 => "ANSI X12",
            Self::Xml => "XML",
        }
    }

    /// Conventional file extension (without the dot)
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Edifact => "edi",
            Self::AnsiX12 => "x12",
            Self::Xml => "xml",
        }
    }

    /// Default segment terminator, if the format is delimited
    pub fn segment_delimiter(self) -> Option<char> {
        match self {
            Self::Edifact => Some('\''),
            Self::AnsiX12 => Some('~'),
            Self::Xml => None,
        }
    }

    /// Default element separator, if the format is delimited
    pub fn element_delimiter(self) -> Option<char> {
        match self {
            Self::Edifact => Some('+'),
            Self::AnsiX12 => Some('*'),
            Self::Xml => None,
        }
    }

    /// Default component separator, if the format is delimited
    pub fn component_delimiter(self) -> Option<char> {
        match self {
            Self::Edifact | Self::AnsiX12 => Some(':'),
            Self::Xml => None,
        }
    }

    /// Whether this is one of the delimited EDI formats
    pub fn is_edi_format(self) -> bool {
        matches!(self, Self::Edifact | Self::AnsiX12)
    }

    /// Guess the format from a file name's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".edi") || lower.ends_with(".edifact") {
            Some(Self::Edifact)
        } else if lower.ends_with(".x12") || lower.ends_with(".ansi") {
            Some(Self::AnsiX12)
        } else if lower.ends_with(".xml") {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
