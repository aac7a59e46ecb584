//! ANSI X12 tokenizer
//!
//! Segments end with `~` and elements are separated by `*`. When an ISA
//! envelope is present its last element names the component separator;
//! otherwise an element is a composite when it contains `:` or `>`, split
//! on whichever appears first. ISA elements are never split.
//!
//! Field positions: `TAG.{i:04}` for simple elements and `TAG.C{i:02}.{j:02}`
//! for component `j` (1-based) of element `i`.

use crate::syntax::{self, Separators};
use crate::{FormatParser, ParseError, Result};
use edi_ir::{Field, FileFormat, Message, Segment};
use tracing::{debug, trace};

const ISA_ELEMENT_COUNT: usize = 16;

/// Stateless ANSI X12 parser
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiX12Parser;

impl AnsiX12Parser {
    pub fn new() -> Self {
        Self
    }

    /// Component separator declared by the ISA envelope (element 16)
    fn isa_component_separator(first_token: &str, sep: &Separators) -> Option<char> {
        let elements = syntax::split_escaped(first_token, sep.element, None);
        if elements[0].trim() != "ISA" || elements.len() <= ISA_ELEMENT_COUNT {
            return None;
        }
        elements[ISA_ELEMENT_COUNT].trim().chars().next()
    }

    fn component_separator(element: &str, declared: Option<char>) -> Option<char> {
        match declared {
            Some(c) => element.contains(c).then_some(c),
            None => element.find([':', '>']).and_then(|i| element[i..].chars().next()),
        }
    }

    fn parse_segment(
        token: &str,
        sep: &Separators,
        declared_component: Option<char>,
        line_number: usize,
        sequence_number: usize,
    ) -> Result<Segment> {
        let elements = syntax::split_escaped(token, sep.element, None);
        let tag = elements[0].trim().to_string();
        if !syntax::is_valid_tag(&tag) {
            return Err(ParseError::segment(
                line_number,
                token,
                "Invalid segment tag",
            ));
        }
        let is_envelope = tag == "ISA";

        let mut fields = Vec::with_capacity(elements.len() - 1);
        for (i, element) in elements.iter().enumerate().skip(1) {
            let component = if is_envelope {
                None
            } else {
                Self::component_separator(element, declared_component)
            };

            match component {
                Some(c) => {
                    for (j, value) in element.split(c).enumerate() {
                        let position = format!("{tag}.C{i:02}.{:02}", j + 1);
                        fields.push(Field::new(position, value.trim())?.with_line_number(line_number));
                    }
                }
                None => {
                    let position = format!("{tag}.{i:04}");
                    fields.push(Field::new(position, element.trim())?.with_line_number(line_number));
                }
            }
        }

        trace!(tag = %tag, fields = fields.len(), line = line_number, "Parsed segment");

        Ok(Segment::new(tag, fields)?
            .with_line_number(line_number)
            .with_sequence_number(sequence_number)
            .with_raw(token))
    }
}

impl FormatParser for AnsiX12Parser {
    fn format(&self) -> FileFormat {
        FileFormat::AnsiX12
    }

    fn parse(&self, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(ParseError::EmptyContent);
        }

        let sep = Separators::x12();
        let tokens: Vec<&str> = content
            .split(sep.segment)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let declared_component = tokens
            .first()
            .and_then(|first| Self::isa_component_separator(first, &sep));

        let mut segments = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            segments.push(Self::parse_segment(
                token,
                &sep,
                declared_component,
                i + 1,
                i,
            )?);
        }

        if segments.is_empty() {
            return Err(ParseError::NoSegments);
        }

        let mut message = Message::new(FileFormat::AnsiX12, segments);
        let header = message.first_segment("ST").map(|st| {
            (
                st.field_value("ST.0001").map(str::to_string),
                st.field_value("ST.0002").map(str::to_string),
            )
        });
        let version = message
            .first_segment("GS")
            .and_then(|gs| gs.field_value("GS.0008"))
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if let Some((message_type, control_number)) = header {
            if let Some(message_type) = message_type.filter(|t| !t.is_empty()) {
                message = message.with_message_type(message_type);
            }
            if let Some(control_number) = control_number.filter(|c| !c.is_empty()) {
                message = message.with_metadata("control_number", control_number);
            }
        }
        if let Some(version) = version {
            message = message.with_metadata("version", version);
        }

        debug!(
            format = %FileFormat::AnsiX12,
            segments = message.segment_count(),
            message_type = message.message_type().unwrap_or("-"),
            "Parsed message"
        );
        Ok(message)
    }

    fn can_parse(&self, content: &str) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return false;
        }
        trimmed.starts_with("ISA") || trimmed.contains('~')
    }
}
