//! Error types for hivfacts
//!
//! This module provides:
//! - Error codes for categorization
//! - Source span tracking for mutation-notation errors
//! - Diagnostic messages with a hint showing the expected syntax

use std::fmt;
use thiserror::Error;

/// Example of a well-formed mutation, quoted in notation errors.
pub const MUTATION_SYNTAX_EXAMPLE: &str = "RT:215Y";

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Notation errors (E1xxx)
    /// Text does not match the mutation grammar
    InvalidNotation = 1001,
    /// No gene token and no default gene
    UnresolvedGene = 1002,
    /// Amino acid outside the accepted alphabet
    InvalidAminoAcid = 1003,
    /// Mutation flavor not admissible for the caller
    UnexpectedFlavor = 1004,
    /// Strain, gene or drug name that is not recognized
    UnknownName = 1005,

    // Resource errors (E2xxx)
    /// Named table resource could not be found or read
    ResourceNotFound = 2001,

    // Coordinate errors (E3xxx)
    /// Position or length outside valid bounds
    OutOfRange = 3001,
    /// Positions belong to different strains
    CrossStrainComparison = 3002,
    /// Mutations combined at different positions
    MismatchedPosition = 3003,

    // Alignment errors (E4xxx)
    /// Impossible alignment adjustment operation
    InvalidAlignmentAdjustment = 4001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidNotation => "invalid mutation notation",
            ErrorCode::UnresolvedGene => "gene not specified",
            ErrorCode::InvalidAminoAcid => "invalid amino acid",
            ErrorCode::UnexpectedFlavor => "unexpected mutation flavor",
            ErrorCode::UnknownName => "unknown name",
            ErrorCode::ResourceNotFound => "resource not found",
            ErrorCode::OutOfRange => "value out of range",
            ErrorCode::CrossStrainComparison => "positions from different strains",
            ErrorCode::MismatchedPosition => "mutations at different positions",
            ErrorCode::InvalidAlignmentAdjustment => "invalid alignment adjustment",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A span in the source input indicating error location
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Starting byte offset (0-indexed)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering everything from `start` to the end of `source`
    pub fn rest_of(source: &str, start: usize) -> Self {
        let start = start.min(source.len());
        Self {
            start,
            end: source.len().max(start + 1),
        }
    }

    /// Format the source with the error highlighted
    ///
    /// ```text
    /// RT:215@
    ///       ^
    /// ```
    pub fn highlight(&self, source: &str) -> String {
        if source.is_empty() {
            return String::new();
        }
        let start = self.start.min(source.len());
        let end = self.end.min(source.len()).max(start);
        let width = (end - start).max(1);
        format!(
            "{}\n{}^{}",
            source,
            " ".repeat(start),
            "~".repeat(width - 1)
        )
    }
}

/// Diagnostic information attached to notation errors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostic {
    pub code: Option<ErrorCode>,
    pub span: Option<SourceSpan>,
    /// The original input (for error display)
    pub source: Option<String>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the diagnostic as a detailed error message
    pub fn format(&self, primary_message: &str) -> String {
        let mut result = String::new();
        if let Some(code) = &self.code {
            result.push_str(&format!("[{}] ", code));
        }
        result.push_str(primary_message);
        if let (Some(span), Some(source)) = (&self.span, &self.source) {
            result.push_str("\n\n");
            result.push_str(&span.highlight(source));
        }
        if let Some(hint) = &self.hint {
            result.push_str("\n\nHint: ");
            result.push_str(hint);
        }
        result
    }
}

/// Main error type for hivfacts operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactsError {
    /// Malformed mutation text or a gene that could not be resolved
    #[error("Invalid mutation notation {text:?} at column {pos}: {msg}")]
    InvalidMutationNotation {
        text: String,
        pos: usize,
        msg: String,
        diagnostic: Option<Box<Diagnostic>>,
    },

    /// Text that names no known strain, gene, drug class or drug
    #[error("Unknown {kind} {name:?}")]
    UnknownName { kind: &'static str, name: String },

    /// A named table resource is missing or unreadable
    #[error("Invalid resource name ({name})")]
    ResourceNotFound { name: String },

    /// Adjustment operation that cannot be applied
    #[error("Invalid alignment adjustment ({pos}, {size}) for {gene}")]
    InvalidAlignmentAdjustment { gene: String, pos: i32, size: i32 },

    /// Positions from two different strains were compared
    #[error("Virus strain of `start` ({start}) and `end` ({end}) positions must be the same")]
    CrossStrainComparison { start: String, end: String },

    /// Position, length or codon outside valid bounds
    #[error("{what} {value} is out of range [{min}, {max}]")]
    OutOfRange {
        what: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Two mutations at different positions were combined
    #[error("Mutations {left} and {right} are not at the same gene position")]
    MismatchedPosition { left: String, right: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl FactsError {
    /// Create a notation error pointing at `pos` in `text`
    pub fn notation(text: &str, pos: usize, msg: impl Into<String>, code: ErrorCode) -> Self {
        let diagnostic = Diagnostic::new()
            .with_code(code)
            .with_span(SourceSpan::rest_of(text, pos))
            .with_source(text)
            .with_hint(format!(
                "The correct format for an input mutation string is, for example, {}.",
                MUTATION_SYNTAX_EXAMPLE
            ));
        FactsError::InvalidMutationNotation {
            text: text.to_string(),
            pos,
            msg: msg.into(),
            diagnostic: Some(Box::new(diagnostic)),
        }
    }

    pub fn unknown_name(kind: &'static str, name: &str) -> Self {
        FactsError::UnknownName {
            kind,
            name: name.to_string(),
        }
    }

    pub fn out_of_range(what: impl Into<String>, value: i64, min: i64, max: i64) -> Self {
        FactsError::OutOfRange {
            what: what.into(),
            value,
            min,
            max,
        }
    }

    /// Get the error code if available
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            FactsError::InvalidMutationNotation { diagnostic, .. } => diagnostic
                .as_ref()
                .and_then(|d| d.code)
                .or(Some(ErrorCode::InvalidNotation)),
            FactsError::UnknownName { .. } => Some(ErrorCode::UnknownName),
            FactsError::ResourceNotFound { .. } => Some(ErrorCode::ResourceNotFound),
            FactsError::InvalidAlignmentAdjustment { .. } => {
                Some(ErrorCode::InvalidAlignmentAdjustment)
            }
            FactsError::CrossStrainComparison { .. } => Some(ErrorCode::CrossStrainComparison),
            FactsError::OutOfRange { .. } => Some(ErrorCode::OutOfRange),
            FactsError::MismatchedPosition { .. } => Some(ErrorCode::MismatchedPosition),
            FactsError::Io { .. } => Some(ErrorCode::IoError),
            FactsError::Json { .. } => Some(ErrorCode::JsonError),
        }
    }

    /// Get a formatted error with full diagnostic output
    pub fn detailed_message(&self) -> String {
        match self {
            FactsError::InvalidMutationNotation {
                diagnostic: Some(d),
                ..
            } => d.format(&self.to_string()),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for FactsError {
    fn from(err: std::io::Error) -> Self {
        FactsError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FactsError {
    fn from(err: serde_json::Error) -> Self {
        FactsError::Json {
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::InvalidNotation.as_str(), "E1001");
        assert_eq!(ErrorCode::ResourceNotFound.as_str(), "E2001");
        assert_eq!(ErrorCode::OutOfRange.as_str(), "E3001");
        assert_eq!(ErrorCode::InvalidAlignmentAdjustment.as_str(), "E4001");
        assert_eq!(ErrorCode::JsonError.as_str(), "E9002");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::CrossStrainComparison), "E3002");
        assert_eq!(
            ErrorCode::UnresolvedGene.description(),
            "gene not specified"
        );
    }

    #[test]
    fn test_highlight() {
        let span = SourceSpan::new(6, 7);
        assert_eq!(span.highlight("RT:215@"), "RT:215@\n      ^");
        let span = SourceSpan::new(3, 6);
        assert_eq!(span.highlight("RT:xyz"), "RT:xyz\n   ^~~");
        assert_eq!(SourceSpan::new(0, 1).highlight(""), "");
    }

    #[test]
    fn test_rest_of_span_past_end() {
        let span = SourceSpan::rest_of("abc", 10);
        assert_eq!(span.start, 3);
        assert_eq!(span.end, 4);
    }

    #[test]
    fn test_notation_error_carries_text_and_hint() {
        let err = FactsError::notation("RT:215@", 6, "unexpected character", ErrorCode::InvalidNotation);
        let msg = err.to_string();
        assert!(msg.contains("RT:215@"));
        assert_eq!(err.code(), Some(ErrorCode::InvalidNotation));
        let detailed = err.detailed_message();
        assert!(detailed.starts_with("[E1001]"));
        assert!(detailed.contains("RT:215Y"));
        assert!(detailed.contains("      ^"));
    }

    #[test]
    fn test_unknown_name_message() {
        let err = FactsError::unknown_name("strain", "HIV3");
        assert_eq!(err.to_string(), "Unknown strain \"HIV3\"");
        assert_eq!(err.code(), Some(ErrorCode::UnknownName));
        assert_eq!(ErrorCode::UnknownName.as_str(), "E1005");
    }

    #[test]
    fn test_resource_not_found_message() {
        let err = FactsError::ResourceNotFound {
            name: "aapcnt/rx-all_subtype-Q.json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid resource name (aapcnt/rx-all_subtype-Q.json)"
        );
        assert_eq!(err.code(), Some(ErrorCode::ResourceNotFound));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = FactsError::out_of_range("HIV1PR position", 100, 1, 99);
        assert_eq!(err.to_string(), "HIV1PR position 100 is out of range [1, 99]");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FactsError = io.into();
        assert!(matches!(err, FactsError::Io { .. }));
        assert_eq!(err.code(), Some(ErrorCode::IoError));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: FactsError = json_err.into();
        assert!(matches!(err, FactsError::Json { .. }));
    }
}
