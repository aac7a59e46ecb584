//! XML tokenizer
//!
//! The root element names the message type. Each element child of the root
//! becomes a segment tagged with the element name:
//! - attributes of that element become `Tag[@attr]` fields
//! - element descendants without element children become `Tag.Child` /
//!   `Tag.Child.Grandchild` fields holding their trimmed text
//!
//! DOCTYPE declarations are refused, so no entity can be defined and no
//! external resource is ever fetched.

use crate::syntax;
use crate::{FormatParser, ParseError, Result};
use edi_ir::{Field, FileFormat, Message, Segment};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, trace};

/// Stateless XML parser
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlParser;

/// Minimal element tree built from reader events
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
    line: usize,
}

/// Maps byte offsets to 1-based line numbers, scanning forward only
struct LineCounter<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            bytes: content.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.bytes.len());
        if position < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        self.line += self.bytes[self.offset..position]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.offset = position;
        self.line
    }
}

fn to_offset<T: TryInto<usize>>(position: T) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

fn xml_error(line: usize, content: &str, reason: impl Into<String>) -> ParseError {
    ParseError::Xml {
        line,
        reason: reason.into(),
        preview: syntax::preview(content.trim()),
    }
}

impl XmlParser {
    pub fn new() -> Self {
        Self
    }

    fn open_element(start: &BytesStart<'_>, line: usize, content: &str) -> Result<XmlElement> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(line, content, e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(line, content, e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(XmlElement {
            name,
            attributes,
            line,
            ..XmlElement::default()
        })
    }

    /// Read the whole document into an element tree and return its root
    fn read_tree(content: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(content);
        let mut lines = LineCounter::new(content);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event_start = to_offset(reader.buffer_position());
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    let line = lines.line_at(to_offset(reader.error_position()));
                    return Err(xml_error(line, content, e.to_string()));
                }
            };

            match event {
                Event::Start(start) => {
                    let line = lines.line_at(event_start);
                    if stack.is_empty() && root.is_some() {
                        return Err(xml_error(line, content, "multiple root elements"));
                    }
                    stack.push(Self::open_element(&start, line, content)?);
                }
                Event::Empty(start) => {
                    let line = lines.line_at(event_start);
                    let element = Self::open_element(&start, line, content)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(xml_error(line, content, "multiple root elements"));
                        }
                    }
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        let line = lines.line_at(event_start);
                        return Err(xml_error(line, content, "unexpected closing tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let line = lines.line_at(event_start);
                    let text = text
                        .unescape()
                        .map_err(|e| xml_error(line, content, e.to_string()))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(xml_error(line, content, "text outside the root element"));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::DocType(_) => {
                    let line = lines.line_at(event_start);
                    return Err(xml_error(
                        line,
                        content,
                        "DOCTYPE declarations are not allowed",
                    ));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(xml_error(
                open.line,
                content,
                format!("unclosed element <{}>", open.name),
            ));
        }

        root.ok_or(ParseError::NoSegments)
    }

    fn collect_fields(element: &XmlElement, path: &str, fields: &mut Vec<Field>) -> Result<()> {
        for child in &element.children {
            let position = format!("{path}.{}", child.name);
            if child.children.is_empty() {
                fields.push(
                    Field::new(position, child.text.trim())?
                        .with_name(child.name.as_str())
                        .with_line_number(child.line),
                );
            } else {
                Self::collect_fields(child, &position, fields)?;
            }
        }
        Ok(())
    }

    fn to_segment(element: &XmlElement, sequence_number: usize) -> Result<Segment> {
        let tag = element.name.as_str();
        let mut fields = Vec::new();

        for (key, value) in &element.attributes {
            fields.push(
                Field::new(format!("{tag}[@{key}]"), value.as_str())?
                    .with_name(key.as_str())
                    .with_line_number(element.line),
            );
        }
        Self::collect_fields(element, tag, &mut fields)?;

        trace!(tag = %tag, fields = fields.len(), line = element.line, "Parsed segment");

        Ok(Segment::new(tag, fields)?
            .with_line_number(element.line)
            .with_sequence_number(sequence_number))
    }
}

impl FormatParser for XmlParser {
    fn format(&self) -> FileFormat {
        FileFormat::Xml
    }

    fn parse(&self, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(ParseError::EmptyContent);
        }

        let root = Self::read_tree(content)?;
        if root.children.is_empty() {
            return Err(ParseError::NoSegments);
        }

        let segments = root
            .children
            .iter()
            .enumerate()
            .map(|(i, element)| Self::to_segment(element, i))
            .collect::<Result<Vec<_>>>()?;

        let message = Message::new(FileFormat::Xml, segments).with_message_type(root.name);

        debug!(
            format = %FileFormat::Xml,
            segments = message.segment_count(),
            message_type = message.message_type().unwrap_or("-"),
            "Parsed message"
        );
        Ok(message)
    }

    fn can_parse(&self, content: &str) -> bool {
        content.trim().starts_with('<')
    }
}
