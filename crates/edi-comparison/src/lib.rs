#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // Accessors and builders read clearly without #[must_use].
#![allow(clippy::module_name_repetitions)] // ComparisonContext, ComparisonResult mirror the domain names.

//! # edi-comparison
//!
//! Rule-driven comparison of parsed EDI messages.
//!
//! [`ComparisonEngine`] applies a [`edi_rules::RuleSet`] to an
//! [`edi_ir::Message`] and returns a [`ComparisonResult`] holding every
//! [`Difference`] found. Comparison never fails: malformed patterns and
//! unresolved sources are reported as differences like any other finding.
//!
//! Two optional passes add findings the rule walk does not produce:
//! [`StructuralAudit`] for unexpected and out-of-order segments, and
//! [`CustomValidationPass`] for `CUSTOM` rules backed by a
//! [`ValidatorRegistry`].
//!
//! ```
//! use edi_comparison::{ComparisonContext, ComparisonEngine};
//! use edi_ir::{Field, FileFormat, Message, Segment};
//! use edi_rules::{ComparisonRule, FieldRule, RuleSet};
//!
//! let bgm = Segment::new("BGM", vec![Field::new("BGM.0001", "340").unwrap()]).unwrap();
//! let message = Message::new(FileFormat::Edifact, vec![bgm]);
//! let rules = RuleSet::new(vec![
//!     ComparisonRule::new("BGM").with_field(FieldRule::exact("BGM.0001", "340")),
//! ]);
//!
//! let context = ComparisonContext::for_rule_set(&rules);
//! let result = ComparisonEngine::new(&rules, &context).compare(&message);
//! assert!(result.is_success());
//! ```

pub mod audit;
pub mod context;
pub mod custom;
pub mod difference;
pub mod engine;
pub mod result;

pub use audit::StructuralAudit;
pub use context::ComparisonContext;
pub use custom::{CustomValidationPass, ValidatorFn, ValidatorRegistry};
pub use difference::{Difference, DifferenceType};
pub use engine::{ComparisonEngine, compare};
pub use result::ComparisonResult;
