//! Message: a whole parsed document with tag-indexed lookup

use crate::format::FileFormat;
use crate::segment::Segment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A parsed message in the uniform segment/field model
///
/// The tag index is built once when the segment list is set and is never
/// mutated afterwards; lookups by tag never rescan the segment list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "MessageData")]
pub struct Message {
    format: FileFormat,
    message_type: Option<String>,
    segments: Vec<Segment>,
    source: Option<String>,
    metadata: BTreeMap<String, String>,
    #[serde(skip)]
    index: HashMap<String, Vec<usize>>,
}

/// Serialized shape of [`Message`], without the derived index
#[derive(Deserialize)]
struct MessageData {
    format: FileFormat,
    #[serde(default)]
    message_type: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl From<MessageData> for Message {
    fn from(data: MessageData) -> Self {
        Message::new(data.format, data.segments)
            .with_optional_type(data.message_type)
            .with_optional_source(data.source)
            .with_metadata_map(data.metadata)
    }
}

fn build_index(segments: &[Segment]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        index.entry(segment.tag().to_string()).or_default().push(i);
    }
    index
}

impl Message {
    /// Create a message of `format` from segments in encounter order
    pub fn new(format: FileFormat, segments: Vec<Segment>) -> Self {
        let index = build_index(&segments);
        Self {
            format,
            message_type: None,
            segments,
            source: None,
            metadata: BTreeMap::new(),
            index,
        }
    }

    /// Copy with a message type identifier
    #[must_use]
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    fn with_optional_type(mut self, message_type: Option<String>) -> Self {
        self.message_type = message_type;
        self
    }

    /// Copy recording where the message was read from
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn with_optional_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Copy with one more metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn with_metadata_map(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Copy with a replacement segment list (the index is rebuilt)
    #[must_use]
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.index = build_index(&segments);
        self.segments = segments;
        self
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn message_type(&self) -> Option<&str> {
        self.message_type.as_deref()
    }

    /// All segments in encounter order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Total number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// All segments carrying `tag`, in encounter order
    pub fn segments_by_tag(&self, tag: &str) -> Vec<&Segment> {
        self.index
            .get(tag)
            .map(|indices| indices.iter().map(|&i| &self.segments[i]).collect())
            .unwrap_or_default()
    }

    /// First segment carrying `tag`
    pub fn first_segment(&self, tag: &str) -> Option<&Segment> {
        self.index
            .get(tag)
            .and_then(|indices| indices.first())
            .map(|&i| &self.segments[i])
    }

    pub fn has_segment(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Number of segments carrying `tag`
    pub fn count_by_tag(&self, tag: &str) -> usize {
        self.index.get(tag).map_or(0, Vec::len)
    }

    /// Segment at a 0-based parse-order index
    pub fn segment_at(&self, sequence_number: usize) -> Option<&Segment> {
        self.segments.get(sequence_number)
    }

    /// Distinct tags in order of first appearance
    pub fn tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .map(Segment::tag)
            .filter(|tag| seen.insert(*tag))
            .collect()
    }

    /// Segments holding at least one field with exactly this value
    pub fn find_segments_by_field_value(&self, value: &str) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| s.fields().iter().any(|f| f.value() == value))
            .collect()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && self.message_type == other.message_type
            && self.segments == other.segments
    }
}

impl Eq for Message {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    fn segment(tag: &str, seq: usize, fields: &[(&str, &str)]) -> Segment {
        let fields = fields
            .iter()
            .map(|(p, v)| Field::new(*p, *v).unwrap())
            .collect();
        Segment::new(tag, fields)
            .unwrap()
            .with_sequence_number(seq)
            .with_line_number(seq + 1)
    }

    fn booking() -> Message {
        Message::new(
            FileFormat::Edifact,
            vec![
                segment("UNH", 0, &[("UNH.0001", "1")]),
                segment("BGM", 1, &[("BGM.0001", "340"), ("BGM.0002", "BOOKING123")]),
                segment("NAD", 2, &[("NAD.0001", "CZ")]),
                segment("NAD", 3, &[("NAD.0001", "CN")]),
                segment("UNT", 4, &[("UNT.0001", "5")]),
            ],
        )
        .with_message_type("IFTMBF")
    }

    #[test]
    fn test_segments_by_tag_preserves_order() {
        let message = booking();
        let nads = message.segments_by_tag("NAD");

        assert_eq!(nads.len(), 2);
        assert_eq!(nads[0].field_value("NAD.0001"), Some("CZ"));
        assert_eq!(nads[1].field_value("NAD.0001"), Some("CN"));
        assert!(message.segments_by_tag("DTM").is_empty());
    }

    #[test]
    fn test_lookup_operations() {
        let message = booking();

        assert_eq!(message.message_type(), Some("IFTMBF"));
        assert_eq!(message.segment_count(), 5);
        assert_eq!(message.count_by_tag("NAD"), 2);
        assert_eq!(message.count_by_tag("DTM"), 0);
        assert!(message.has_segment("BGM"));
        assert!(!message.has_segment("DTM"));
        assert_eq!(
            message.first_segment("NAD").map(Segment::sequence_number),
            Some(2)
        );
        assert_eq!(message.segment_at(1).map(Segment::tag), Some("BGM"));
        assert!(message.segment_at(5).is_none());
        assert_eq!(message.tags(), vec!["UNH", "BGM", "NAD", "UNT"]);
    }

    #[test]
    fn test_find_segments_by_field_value() {
        let message = booking();
        let found = message.find_segments_by_field_value("BOOKING123");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag(), "BGM");
    }

    #[test]
    fn test_with_segments_rebuilds_index() {
        let message = booking();
        let trimmed = message
            .clone()
            .with_segments(vec![segment("DTM", 0, &[("DTM.0001", "137")])]);

        assert!(trimmed.has_segment("DTM"));
        assert!(!trimmed.has_segment("NAD"));
        assert_eq!(trimmed.message_type(), Some("IFTMBF"));
        // the original is untouched
        assert_eq!(message.count_by_tag("NAD"), 2);
    }

    #[test]
    fn test_metadata_and_source() {
        let message = booking()
            .with_metadata("version", "D_96A")
            .with_source("/tmp/booking.edi");

        assert_eq!(message.metadata_value("version"), Some("D_96A"));
        assert_eq!(message.metadata_value("missing"), None);
        assert_eq!(message.source(), Some("/tmp/booking.edi"));
    }

    #[test]
    fn test_structural_equality() {
        let a = booking();
        let b = booking().with_source("elsewhere");
        let c = booking().with_message_type("IFTMIN");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let message = booking();
        let json = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();

        assert_eq!(back, message);
        assert_eq!(back.count_by_tag("NAD"), 2);
        assert!(!json.contains("index"));
    }

    #[test]
    fn test_deserialize_rejects_blank_segment_tag() {
        let json = r#"{"format":"EDIFACT","segments":[{"tag":"","fields":[]}]}"#;
        let err = serde_json::from_str::<Message>(json).unwrap_err();
        assert!(err.to_string().contains("tag"), "{err}");
    }
}
