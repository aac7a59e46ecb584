//! Integration tests for edi-rules
//!
//! Loads the sample rule files under `testdata/rules`.

use edi_rules::{Error, RuleLoader, SourceRef, ValidationType};
use std::io::Write;
use std::path::PathBuf;

fn testdata_path(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("testdata")
        .join(path)
}

#[test]
fn loads_yaml_booking_rules() -> anyhow::Result<()> {
    let rules = RuleLoader::new().load_from_file(&testdata_path("rules/iftmbf_booking.yaml"))?;

    assert_eq!(rules.message_type.as_deref(), Some("IFTMBF"));
    assert_eq!(rules.rule_count(), 5);
    assert_eq!(rules.config.get("case_sensitive"), Some(&serde_json::Value::Bool(true)));

    let bgm = rules.rule_for_segment("BGM").expect("BGM rule");
    assert!(bgm.required);
    assert!(!bgm.multiple_occurrences);
    let source = bgm.fields[1].source.as_deref().expect("booking number source");
    assert_eq!(SourceRef::parse(source), SourceRef::TestData("bookingNumber"));

    let dtm = rules.rule_for_segment("DTM").expect("DTM rule");
    assert_eq!(dtm.fields[0].validation, ValidationType::DateFormat);
    assert_eq!(dtm.fields[0].date_format_field.as_deref(), Some("DTM.C000.0003"));

    assert!(rules.rule_for_segment("NAD").is_some_and(|r| r.multiple_occurrences));
    assert!(rules.rule_for_segment("EQD").is_some_and(|r| !r.required));
    Ok(())
}

#[test]
fn loads_json_shipment_rules() -> anyhow::Result<()> {
    let rules = RuleLoader::new().load_from_file(&testdata_path("rules/x12_214_shipment.json"))?;

    assert_eq!(rules.message_type.as_deref(), Some("214"));
    let b10 = rules.rule_for_segment("B10").expect("B10 rule");
    // lower-case "pattern" is accepted
    assert_eq!(b10.fields[0].validation, ValidationType::PatternMatch);
    // no validation given means exact match
    assert_eq!(b10.fields[1].validation, ValidationType::ExactMatch);
    assert!(!rules.has_rule_for_segment("ISA"));
    Ok(())
}

#[test]
fn yaml_file_with_other_extension_is_read_as_yaml() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".rules").tempfile()?;
    writeln!(file, "rules:\n  - segment: ST\n    fields:\n      - position: ST.0001\n        validation: exists")?;

    let rules = RuleLoader::new().load_from_file(file.path())?;
    assert_eq!(rules.rules[0].fields[0].validation, ValidationType::Exists);
    Ok(())
}

#[test]
fn missing_file_is_not_found() {
    let err = RuleLoader::new()
        .load_from_file(&testdata_path("rules/missing.yaml"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
