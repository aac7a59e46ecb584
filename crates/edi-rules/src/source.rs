//! Dynamic expected-value references
//!
//! A field rule's `source` is kept as text in the rule set and only
//! interpreted here, when a comparison needs the expected value.

const TEST_DATA_PREFIX: &str = "testData.";
const INBOUND_PREFIX: &str = "inbound.";

/// Parsed form of a `source` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef<'a> {
    /// `testData.<key>`
    TestData(&'a str),

    /// `inbound.<segmentTag>.<position>`; `position` is the full field path
    /// (tag included) as stored in the segment, e.g. `BGM.0001`.
    Inbound {
        segment_tag: &'a str,
        position: &'a str,
    },

    /// Anything else is used verbatim
    Literal(&'a str),
}

impl<'a> SourceRef<'a> {
    /// Interpret a source string
    pub fn parse(source: &'a str) -> Self {
        if let Some(key) = source.strip_prefix(TEST_DATA_PREFIX) {
            return Self::TestData(key);
        }

        if let Some(path) = source.strip_prefix(INBOUND_PREFIX) {
            let tag_end = path.find(['.', '[']).unwrap_or(path.len());
            return Self::Inbound {
                segment_tag: &path[..tag_end],
                position: path,
            };
        }

        Self::Literal(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_data_reference() {
        assert_eq!(
            SourceRef::parse("testData.bookingNumber"),
            SourceRef::TestData("bookingNumber")
        );
    }

    #[test]
    fn test_inbound_reference() {
        assert_eq!(
            SourceRef::parse("inbound.BGM.0002"),
            SourceRef::Inbound {
                segment_tag: "BGM",
                position: "BGM.0002"
            }
        );
        assert_eq!(
            SourceRef::parse("inbound.NAD.C002.0001"),
            SourceRef::Inbound {
                segment_tag: "NAD",
                position: "NAD.C002.0001"
            }
        );
    }

    #[test]
    fn test_inbound_xml_attribute_reference() {
        assert_eq!(
            SourceRef::parse("inbound.Party[@type]"),
            SourceRef::Inbound {
                segment_tag: "Party",
                position: "Party[@type]"
            }
        );
    }

    #[test]
    fn test_literal_fallback() {
        assert_eq!(SourceRef::parse("340"), SourceRef::Literal("340"));
        // prefixes are case-sensitive
        assert_eq!(
            SourceRef::parse("testdata.key"),
            SourceRef::Literal("testdata.key")
        );
    }
}
