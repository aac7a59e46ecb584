//! EDIFACT tokenizer
//!
//! Splits a message on the segment terminator, then each segment on the
//! element and component separators. A leading UNA advice replaces the
//! default separators and is not emitted as a segment.
//!
//! Field positions:
//! - simple element `i` (1-based, tag excluded): `TAG.{i:04}`
//! - component `j` (1-based) of the composite at data element index
//!   `i - 1`: `TAG.C{i-1:03}.{j:04}`, so `NAD+CZ+SHIPPER001::92` yields
//!   `NAD.C001.0001` through `NAD.C001.0003`

use crate::syntax::{self, Separators};
use crate::{FormatParser, ParseError, Result};
use edi_ir::{Field, FileFormat, Message, Segment};
use tracing::{debug, trace};

/// Stateless EDIFACT parser
#[derive(Debug, Default, Clone, Copy)]
pub struct EdifactParser;

impl EdifactParser {
    pub fn new() -> Self {
        Self
    }

    /// Separators in effect for `content` and the byte offset where the
    /// first real segment starts
    fn separators(content: &str) -> (Separators, usize) {
        if content.starts_with("UNA") {
            if let Some(sep) = Separators::from_una(content) {
                return (sep, sep.una_len());
            }
        }
        (Separators::default(), 0)
    }

    fn parse_segment(
        token: &str,
        sep: &Separators,
        line_number: usize,
        sequence_number: usize,
    ) -> Result<Segment> {
        let elements = syntax::split_escaped(token, sep.element, sep.release);
        let tag = syntax::unescape(elements[0], sep.release).trim().to_string();
        if !syntax::is_valid_tag(&tag) {
            return Err(ParseError::segment(
                line_number,
                token,
                "Invalid segment tag",
            ));
        }

        let mut fields = Vec::with_capacity(elements.len() - 1);
        for (i, element) in elements.iter().enumerate().skip(1) {
            let components = syntax::split_escaped(element, sep.component, sep.release);
            if components.len() > 1 {
                for (j, component) in components.iter().enumerate() {
                    let position = format!("{tag}.C{:03}.{:04}", i - 1, j + 1);
                    let value = syntax::unescape(component, sep.release);
                    fields.push(Field::new(position, value.trim())?.with_line_number(line_number));
                }
            } else {
                let position = format!("{tag}.{i:04}");
                let value = syntax::unescape(element, sep.release);
                fields.push(Field::new(position, value.trim())?.with_line_number(line_number));
            }
        }

        trace!(tag = %tag, fields = fields.len(), line = line_number, "Parsed segment");

        Ok(Segment::new(tag, fields)?
            .with_line_number(line_number)
            .with_sequence_number(sequence_number)
            .with_raw(token))
    }
}

impl FormatParser for EdifactParser {
    fn format(&self) -> FileFormat {
        FileFormat::Edifact
    }

    fn parse(&self, content: &str) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ParseError::EmptyContent);
        }

        let (sep, start) = Self::separators(content);
        let body = &content[start..];

        let mut segments = Vec::new();
        for token in syntax::split_escaped(body, sep.segment, sep.release) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let line_number = segments.len() + 1;
            segments.push(Self::parse_segment(
                token,
                &sep,
                line_number,
                segments.len(),
            )?);
        }

        if segments.is_empty() {
            return Err(ParseError::NoSegments);
        }

        let mut message = Message::new(FileFormat::Edifact, segments);
        if let Some(unh) = message.first_segment("UNH") {
            let message_type = unh
                .field_value("UNH.C001.0001")
                .or_else(|| unh.field_value("UNH.0002"))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            let version = match (
                unh.field_value("UNH.C001.0002"),
                unh.field_value("UNH.C001.0003"),
            ) {
                (Some(v), Some(r)) if !v.is_empty() && !r.is_empty() => Some(format!("{v}_{r}")),
                _ => None,
            };
            let reference = unh
                .field_value("UNH.0001")
                .filter(|r| !r.is_empty())
                .map(str::to_string);

            if let Some(message_type) = message_type {
                message = message.with_message_type(message_type);
            }
            if let Some(version) = version {
                message = message.with_metadata("version", version);
            }
            if let Some(reference) = reference {
                message = message.with_metadata("message_reference", reference);
            }
        }

        debug!(
            format = %FileFormat::Edifact,
            segments = message.segment_count(),
            message_type = message.message_type().unwrap_or("-"),
            "Parsed message"
        );
        Ok(message)
    }

    fn can_parse(&self, content: &str) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed.starts_with('<') || trimmed.starts_with("ISA") {
            return false;
        }
        trimmed.starts_with("UNA")
            || trimmed.starts_with("UNB")
            || trimmed.starts_with("UNH")
            || (trimmed.contains('\'') && trimmed.contains('+'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING: &str = "UNH+1+IFTMBF:D:96A:UN'\n\
                           BGM+340+BOOKING123+9'\n\
                           NAD+CZ+SHIPPER001::92'\n\
                           UNT+3+1'";

    #[test]
    fn test_parse_message() {
        let message = EdifactParser::new().parse(BOOKING).unwrap();

        assert_eq!(message.format(), FileFormat::Edifact);
        assert_eq!(message.message_type(), Some("IFTMBF"));
        assert_eq!(message.segment_count(), 4);
        assert_eq!(message.metadata_value("version"), Some("D_96A"));
        assert_eq!(message.metadata_value("message_reference"), Some("1"));

        let bgm = message.first_segment("BGM").unwrap();
        assert_eq!(bgm.field_count(), 3);
        assert_eq!(bgm.sequence_number(), 1);
        assert_eq!(bgm.line_number(), 2);
        assert_eq!(bgm.raw(), Some("BGM+340+BOOKING123+9"));
    }

    #[test]
    fn test_simple_field_positions() {
        let message = EdifactParser::new().parse("BGM+340+BOOKING123+9'").unwrap();

        assert_eq!(message.segment_count(), 1);
        let bgm = &message.segments()[0];
        assert_eq!(bgm.tag(), "BGM");
        assert_eq!(bgm.field_value("BGM.0001"), Some("340"));
        assert_eq!(bgm.field_value("BGM.0002"), Some("BOOKING123"));
        assert_eq!(bgm.field_value("BGM.0003"), Some("9"));
        assert_eq!(bgm.fields()[0].line_number(), 1);
    }

    #[test]
    fn test_composite_field_positions() {
        let message = EdifactParser::new()
            .parse("NAD+CZ+SHIPPER001::92'")
            .unwrap();
        let nad = &message.segments()[0];

        assert_eq!(nad.field_value("NAD.0001"), Some("CZ"));
        assert_eq!(nad.field_value("NAD.C001.0001"), Some("SHIPPER001"));
        assert_eq!(nad.field_value("NAD.C001.0002"), Some(""));
        assert_eq!(nad.field_value("NAD.C001.0003"), Some("92"));
        assert_eq!(nad.field_count(), 4);
    }

    #[test]
    fn test_multiple_segments_same_tag() {
        let content = "BGM+340+BOOKING123'\n\
                       NAD+CZ+SHIPPER001'\n\
                       NAD+CN+CONSIGNEE001'\n\
                       DTM+137:20240207:102'";
        let message = EdifactParser::new().parse(content).unwrap();

        assert_eq!(message.segment_count(), 4);
        let nads = message.segments_by_tag("NAD");
        assert_eq!(nads.len(), 2);
        assert_eq!(nads[0].field_value("NAD.0001"), Some("CZ"));
        assert_eq!(nads[1].field_value("NAD.0001"), Some("CN"));

        let dtm = message.first_segment("DTM").unwrap();
        assert_eq!(dtm.field_value("DTM.C000.0002"), Some("20240207"));
        assert_eq!(dtm.field_value("DTM.C000.0003"), Some("102"));
    }

    #[test]
    fn test_sequence_and_line_numbers() {
        let message = EdifactParser::new()
            .parse("BGM+340'\nNAD+CZ'\nDTM+137'")
            .unwrap();

        for (i, segment) in message.segments().iter().enumerate() {
            assert_eq!(segment.sequence_number(), i);
            assert_eq!(segment.line_number(), i + 1);
        }
    }

    #[test]
    fn test_una_and_release_character() {
        let content = "UNA:+.? '\nFTX+AAI+++FRAGILE?: HANDLE?+STORE DRY'";
        let message = EdifactParser::new().parse(content).unwrap();

        assert_eq!(message.segment_count(), 1);
        let ftx = &message.segments()[0];
        assert_eq!(ftx.tag(), "FTX");
        assert_eq!(ftx.field_value("FTX.0002"), Some(""));
        assert_eq!(
            ftx.field_value("FTX.0004"),
            Some("FRAGILE: HANDLE+STORE DRY")
        );
    }

    #[test]
    fn test_una_custom_separators() {
        let content = "UNA|*.? \"BGM*340*BOOKING123\"DTM*137|20240207|102\"";
        let message = EdifactParser::new().parse(content).unwrap();

        assert_eq!(message.segment_count(), 2);
        let bgm = message.first_segment("BGM").unwrap();
        assert_eq!(bgm.field_value("BGM.0002"), Some("BOOKING123"));
        let dtm = message.first_segment("DTM").unwrap();
        assert_eq!(dtm.field_value("DTM.C000.0002"), Some("20240207"));
    }

    #[test]
    fn test_blank_tokens_discarded() {
        let message = EdifactParser::new()
            .parse("BGM+340'  ''\n\n NAD+CZ' ")
            .unwrap();
        assert_eq!(message.segment_count(), 2);
        assert!(message.message_type().is_none());
    }

    #[test]
    fn test_empty_content_rejected() {
        let err = EdifactParser::new().parse("  \n ").unwrap_err();
        assert!(matches!(err, ParseError::EmptyContent));
    }

    #[test]
    fn test_una_only_has_no_segments() {
        let err = EdifactParser::new().parse("UNA:+.? '").unwrap_err();
        assert!(matches!(err, ParseError::NoSegments));
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let err = EdifactParser::new()
            .parse("BGM+340'\n+MISSINGTAG'")
            .unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert_eq!(err.content_preview(), Some("+MISSINGTAG"));
    }

    #[test]
    fn test_can_parse() {
        let parser = EdifactParser::new();
        assert!(parser.can_parse("UNH+1+IFTMBF'"));
        assert!(parser.can_parse("BGM+340+TEST'"));
        assert!(!parser.can_parse("ISA*00*"));
        assert!(!parser.can_parse("<?xml"));
        assert!(!parser.can_parse(""));
    }
}
