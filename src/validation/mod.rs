//! Quality validation of mutation lists, aligned sequences and reads
//!
//! Every validator runs a fixed list of rule families and returns
//! [`ValidationResult`]s in family order, then gene order. Rules only read
//! the [`ReferenceTables`](crate::tables::ReferenceTables) they were given.
//!
//! # Example
//!
//! ```ignore
//! use hivfacts::validation::{MutationsValidator, Validator};
//!
//! let validator = MutationsValidator::new(tables);
//! for result in validator.validate(&mutations, &GeneKind::ALL) {
//!     println!("{}: {}", result.level, result.text());
//! }
//! ```

pub mod input;
pub mod message;
pub mod mutations;
pub mod reads;
pub(crate) mod rules;
pub mod sequence;

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::gene::GeneKind;

pub use input::{
    AlignedGeneSequence, AlignedSequence, CodonReads, FrameShift, FrameShiftKind,
    GeneSequenceReads, PositionCodonReads, ReadsCoverage, SequenceReads,
};
pub use message::{and_list, GeneMutations, SequenceEnd, ValidationMessage};
pub use mutations::MutationsValidator;
pub use reads::{Hiv1ReadsValidator, Hiv2ReadsValidator};
pub use sequence::SequenceValidator;

/// Severity of a validation result, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationLevel {
    Ok,
    Note,
    Warning,
    SevereWarning,
    Critical,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Ok => "OK",
            ValidationLevel::Note => "NOTE",
            ValidationLevel::Warning => "WARNING",
            ValidationLevel::SevereWarning => "SEVERE_WARNING",
            ValidationLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding: a level and a typed message
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub level: ValidationLevel,
    pub message: ValidationMessage,
}

impl ValidationResult {
    pub fn new(level: ValidationLevel, message: ValidationMessage) -> Self {
        Self { level, message }
    }

    /// Rendered message text
    pub fn text(&self) -> String {
        self.message.to_string()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Serialized as `{"level": "WARNING", "message": "..."}`
impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("message", &self.text())?;
        state.end()
    }
}

/// A set of rules applied to one kind of input
///
/// Implementations might include:
/// - [`MutationsValidator`] for bare mutation lists
/// - [`SequenceValidator`] for aligned sequences
/// - [`Hiv1ReadsValidator`] and [`Hiv2ReadsValidator`] for codon reads
pub trait Validator {
    type Input: ?Sized;

    /// Validate `input`, looking only at genes whose kind is in `include`
    fn validate(&self, input: &Self::Input, include: &[GeneKind]) -> Vec<ValidationResult>;

    /// Highest level among the results, `Ok` when there are none
    fn worst_level(&self, input: &Self::Input, include: &[GeneKind]) -> ValidationLevel {
        self.validate(input, include)
            .iter()
            .map(|r| r.level)
            .max()
            .unwrap_or(ValidationLevel::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(ValidationLevel::Ok < ValidationLevel::Note);
        assert!(ValidationLevel::Note < ValidationLevel::Warning);
        assert!(ValidationLevel::Warning < ValidationLevel::SevereWarning);
        assert!(ValidationLevel::SevereWarning < ValidationLevel::Critical);
    }

    #[test]
    fn test_result_serialization() {
        let result = ValidationResult::new(
            ValidationLevel::SevereWarning,
            ValidationMessage::NgsTooLowThreshold,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["level"], "SEVERE_WARNING");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Extensive empirical data"));
        assert_eq!(result.to_string().split(':').next(), Some("SEVERE_WARNING"));
    }
}
