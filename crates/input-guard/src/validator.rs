//! High-level validator that combines the [`ThreatScanner`] and the
//! sanitizer into a single verdict per submitted field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sanitizer::sanitize;
use crate::scanner::{ScannerError, ThreatScanner};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Fixed diagnostic appended when the threat scanner fires.
pub const SQL_PATTERN_MESSAGE: &str = "Input contains potentially dangerous SQL patterns";

/// Diagnostic for a malformed [`InputType::Email`] value.
pub const EMAIL_FORMAT_MESSAGE: &str = "Invalid email address format";

/// Diagnostic for a malformed [`InputType::Numeric`] value.
pub const NUMERIC_FORMAT_MESSAGE: &str = "Input must be a numeric value";

// ---------------------------------------------------------------------------
// InputType
// ---------------------------------------------------------------------------

/// The logical kind of a submitted field.
///
/// Determines which format checks run after the shared threat/sanitization
/// pass.  The enum is closed and matched exhaustively, so passing an
/// unsupported kind is a compile error rather than a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Free text; no format checks beyond the shared pass.
    Text,
    /// An email address.
    Email,
    /// An integer or decimal number, optionally signed.
    Numeric,
}

impl Default for InputType {
    fn default() -> Self {
        Self::Text
    }
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// The outcome of validating one field.
///
/// `sanitized` is always populated, even when `is_valid` is false: rejected
/// input may still need safe display (echoing the offending value in an
/// error UI) or auditing.  `errors` is non-empty iff `is_valid` is false,
/// and preserves detection order: threat-pattern errors precede
/// type-specific format errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub sanitized: String,
}

// ---------------------------------------------------------------------------
// InputValidator
// ---------------------------------------------------------------------------

/// Main entry point for untrusted-field validation.
///
/// # Example
///
/// ```rust
/// use input_guard::{InputType, InputValidator};
///
/// let validator = InputValidator::new().unwrap();
/// let result = validator.validate("O'Reilly", InputType::Text);
/// assert!(result.is_valid);
/// assert_eq!(result.sanitized, "O&#x27;Reilly");
/// ```
pub struct InputValidator {
    scanner: ThreatScanner,
    email_re: Regex,
    numeric_re: Regex,
}

impl InputValidator {
    /// Compile the threat patterns and format regexes.
    pub fn new() -> Result<Self, ScannerError> {
        let scanner = ThreatScanner::new()?;
        let email_re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?;
        let numeric_re = Regex::new(r"^-?\d+(\.\d+)?$")?;
        Ok(Self {
            scanner,
            email_re,
            numeric_re,
        })
    }

    /// Borrow the underlying scanner (for callers that only need the
    /// boolean threat predicate).
    pub fn scanner(&self) -> &ThreatScanner {
        &self.scanner
    }

    /// Validate one field.
    ///
    /// The sanitized rendering is computed unconditionally; the threat scan
    /// runs against the **raw** input, never the escaped form, since
    /// escaping can mask or alter keyword adjacency.  Pure function of
    /// `(input, input_type)`: no I/O, no randomness, no time-dependence.
    pub fn validate(&self, input: &str, input_type: InputType) -> ValidationResult {
        let sanitized = sanitize(input);
        let mut errors = Vec::new();

        if self.scanner.is_threat(input) {
            for f in self.scanner.scan(input) {
                warn!(
                    pattern = %f.pattern_name,
                    category = %f.category,
                    offset = f.offset,
                    "sql injection pattern detected"
                );
            }
            errors.push(SQL_PATTERN_MESSAGE.to_string());
        }

        match input_type {
            InputType::Text => {}
            InputType::Email => {
                if !self.email_re.is_match(input) {
                    errors.push(EMAIL_FORMAT_MESSAGE.to_string());
                }
            }
            InputType::Numeric => {
                if !self.numeric_re.is_match(input) {
                    errors.push(NUMERIC_FORMAT_MESSAGE.to_string());
                }
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            sanitized,
        }
    }
}

impl Default for InputValidator {
    /// # Panics
    ///
    /// Panics if the built-in pattern library fails to compile (should never
    /// happen with the static patterns).
    fn default() -> Self {
        Self::new().expect("built-in patterns must compile")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
