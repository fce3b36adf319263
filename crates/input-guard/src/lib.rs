//! # input-guard
//!
//! Detects and neutralises injection payloads in untrusted text submitted
//! at the request boundary (form fields, query parameters, comment bodies).
//!
//! The crate is organised around three layers:
//!
//! 1. **[`patterns`]** -- static catalogue of regex-based threat patterns,
//!    grouped by [`ThreatCategory`](patterns::ThreatCategory).
//! 2. **[`scanner`]** -- compiles the patterns into a [`RegexSet`](regex::RegexSet)
//!    and answers the boolean threat predicate (with [`Finding`](scanner::Finding)
//!    values available for diagnostics).
//! 3. **[`sanitizer`]** / **[`validator`]** -- deterministic HTML-entity
//!    escaping, and the [`InputValidator`](validator::InputValidator) that
//!    combines detection and sanitization into one
//!    [`ValidationResult`](validator::ValidationResult) per field.
//!
//! Detection is a best-effort heuristic gate; escaping is the actual safety
//! net.  Callers must store and render the `sanitized` value, never the raw
//! input, whatever the verdict.
//!
//! ## Quick start
//!
//! ```rust
//! use input_guard::{has_sql_injection_pattern, validate_input, InputType};
//!
//! assert!(has_sql_injection_pattern("' UNION SELECT * FROM users --"));
//! assert!(!has_sql_injection_pattern("John O'Brien"));
//!
//! let result = validate_input("O'Reilly", InputType::Text);
//! assert!(result.is_valid);
//! assert_eq!(result.sanitized, "O&#x27;Reilly");
//! ```

use once_cell::sync::Lazy;

pub mod patterns;
pub mod sanitizer;
pub mod scanner;
pub mod validator;

// Re-export the most commonly used types at the crate root for ergonomic
// imports (`use input_guard::InputValidator`).
pub use patterns::{ThreatCategory, ThreatPattern, PATTERNS};
pub use sanitizer::sanitize;
pub use scanner::{Finding, ScannerError, ThreatScanner};
pub use validator::{
    InputType, InputValidator, ValidationResult, EMAIL_FORMAT_MESSAGE, NUMERIC_FORMAT_MESSAGE,
    SQL_PATTERN_MESSAGE,
};

/// Process-wide validator, compiled once on first use and shared read-only
/// across all calls.  The catalogue is never mutated after construction, so
/// no synchronisation beyond the lazy init is needed.
static SHARED: Lazy<InputValidator> =
    Lazy::new(|| InputValidator::new().expect("built-in patterns must compile"));

/// Stateless predicate: does `input` plausibly contain an SQL/NoSQL
/// injection payload?
///
/// Usable standalone for quick rejection paths.  The empty string returns
/// `false`; the function cannot fail, only return `false` on payloads it
/// does not recognise.
pub fn has_sql_injection_pattern(input: &str) -> bool {
    SHARED.scanner().is_threat(input)
}

/// Validate one untrusted field against the shared catalogue.
///
/// See [`InputValidator::validate`] for the contract.
pub fn validate_input(input: &str, input_type: InputType) -> ValidationResult {
    SHARED.validate(input, input_type)
}
