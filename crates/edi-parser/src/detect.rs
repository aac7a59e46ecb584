//! Format auto-detection

use crate::{AnsiX12Parser, EdifactParser, FormatParser, ParseError, Result, XmlParser};
use edi_ir::{FileFormat, Message};
use std::path::Path;
use tracing::debug;

/// Guess the format of `content` by sniffing its leading characters
///
/// XML wins on a leading `<`, an `ISA` envelope marks X12, then EDIFACT
/// and X12 heuristics are tried in that order.
pub fn detect_format(content: &str) -> Option<FileFormat> {
    let trimmed = content.trim_start();
    if XmlParser.can_parse(trimmed) {
        return Some(FileFormat::Xml);
    }
    if trimmed.starts_with("ISA") {
        return Some(FileFormat::AnsiX12);
    }
    if EdifactParser.can_parse(trimmed) {
        return Some(FileFormat::Edifact);
    }
    if AnsiX12Parser.can_parse(trimmed) {
        return Some(FileFormat::AnsiX12);
    }
    None
}

/// Parser for `format`
pub fn parser_for(format: FileFormat) -> Box<dyn FormatParser> {
    match format {
        FileFormat::Edifact => Box::new(EdifactParser::new()),
        FileFormat::AnsiX12 => Box::new(AnsiX12Parser::new()),
        FileFormat::Xml => Box::new(XmlParser::new()),
    }
}

/// Detect the format of `content` and parse it
///
/// # Errors
///
/// Returns [`ParseError::EmptyContent`] for blank input,
/// [`ParseError::UnknownFormat`] when no format matches, otherwise the
/// errors of the selected parser.
pub fn parse_auto(content: &str) -> Result<Message> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyContent);
    }
    let format = detect_format(content).ok_or(ParseError::UnknownFormat)?;
    debug!(format = %format, "Detected message format");
    parser_for(format).parse(content)
}

/// Parse a file, choosing the format by extension and then by content
///
/// # Errors
///
/// Returns [`ParseError::Io`] when the file cannot be read,
/// [`ParseError::UnknownFormat`] when no format matches, otherwise the
/// errors of the selected parser.
pub fn parse_path(path: &Path) -> Result<Message> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let by_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(FileFormat::from_filename);

    let message = match by_name {
        Some(format) => parser_for(format).parse(&content)?,
        None => parse_auto(&content)?,
    };
    Ok(message.with_source(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format("UNA:+.? 'UNH+1+IFTMBF'"),
            Some(FileFormat::Edifact)
        );
        assert_eq!(detect_format("BGM+340+TEST'"), Some(FileFormat::Edifact));
        assert_eq!(detect_format("ISA*00*~"), Some(FileFormat::AnsiX12));
        assert_eq!(detect_format("ST*214*0001~"), Some(FileFormat::AnsiX12));
        assert_eq!(
            detect_format("\n  <?xml version=\"1.0\"?><A/>"),
            Some(FileFormat::Xml)
        );
        assert_eq!(detect_format("plain text"), None);
    }

    #[test]
    fn test_parser_for() {
        for format in [FileFormat::Edifact, FileFormat::AnsiX12, FileFormat::Xml] {
            assert_eq!(parser_for(format).format(), format);
        }
    }

    #[test]
    fn test_parse_auto() {
        let message = parse_auto("ST*214*0001~B10*SHIP1*BOL1*SCAC~").unwrap();
        assert_eq!(message.format(), FileFormat::AnsiX12);
        assert_eq!(message.message_type(), Some("214"));

        assert!(matches!(
            parse_auto("hello").unwrap_err(),
            ParseError::UnknownFormat
        ));
        assert!(matches!(
            parse_auto("").unwrap_err(),
            ParseError::EmptyContent
        ));
    }
}
