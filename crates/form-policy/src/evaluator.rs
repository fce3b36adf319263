use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use input_guard::{InputType, InputValidator, ValidationResult};

use crate::schema::{FieldRule, FormProfile, UnknownFieldPolicy};

/// Diagnostic appended when a submission carries a field the profile does
/// not declare and the profile's policy is [`UnknownFieldPolicy::Reject`].
pub const UNDECLARED_FIELD_MESSAGE: &str = "Field is not declared in the form profile";

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// The engine verdict for one submitted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldReport {
    /// Submitted field name.
    pub field: String,
    /// Full validation outcome, sanitized rendering included.  Present for
    /// rejected fields too, so callers always have a display-safe value.
    pub result: ValidationResult,
}

/// The verdict for a whole submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// True iff no field failed and no required field is missing.
    pub is_valid: bool,
    /// Per-field reports: declared fields in profile order, then any
    /// undeclared fields in name order.
    pub fields: Vec<FieldReport>,
    /// Names of required fields absent from the submission.
    pub missing: Vec<String>,
}

// ---------------------------------------------------------------------------
// FormPolicy
// ---------------------------------------------------------------------------

/// Evaluates whole submissions against a validated [`FormProfile`].
///
/// Construct via [`FormPolicy::new`], which compiles the embedded
/// [`InputValidator`] once; evaluation itself is pure and stateless.
pub struct FormPolicy {
    profile: FormProfile,
    validator: InputValidator,
}

impl std::fmt::Debug for FormPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormPolicy")
            .field("version", &self.profile.version)
            .field("name", &self.profile.name)
            .field("num_fields", &self.profile.fields.len())
            .finish()
    }
}

impl FormPolicy {
    /// Create a policy from a validated [`FormProfile`].
    pub fn new(profile: FormProfile) -> Result<Self> {
        let validator = InputValidator::new()
            .context("failed to compile the input-guard pattern library")?;
        Ok(Self { profile, validator })
    }

    /// Return a reference to the underlying profile.
    pub fn profile(&self) -> &FormProfile {
        &self.profile
    }

    /// Evaluate one submission (field name -> raw value).
    ///
    /// Every declared, present field runs through
    /// [`InputValidator::validate`]; profile-level length bounds are
    /// appended after the engine's errors so threat-pattern diagnostics
    /// always come first.  Undeclared fields are handled per the profile's
    /// [`UnknownFieldPolicy`].
    pub fn evaluate_submission(&self, values: &BTreeMap<String, String>) -> SubmissionReport {
        debug!(
            profile = self.profile.name.as_deref().unwrap_or("<unnamed>"),
            num_values = values.len(),
            "evaluating submission against profile"
        );

        let mut fields = Vec::new();
        let mut missing = Vec::new();

        for rule in &self.profile.fields {
            match values.get(&rule.name) {
                Some(value) => fields.push(self.evaluate_field(rule, value)),
                None => {
                    if rule.required {
                        missing.push(rule.name.clone());
                    }
                }
            }
        }

        let declared: HashSet<&str> =
            self.profile.fields.iter().map(|r| r.name.as_str()).collect();

        // BTreeMap iteration keeps undeclared-field reports in name order.
        for (name, value) in values {
            if declared.contains(name.as_str()) {
                continue;
            }
            let mut result = self.validator.validate(value, InputType::Text);
            if self.profile.unknown_fields == UnknownFieldPolicy::Reject {
                result.errors.push(UNDECLARED_FIELD_MESSAGE.to_string());
                result.is_valid = false;
            }
            fields.push(FieldReport {
                field: name.clone(),
                result,
            });
        }

        let is_valid = missing.is_empty() && fields.iter().all(|f| f.result.is_valid);

        SubmissionReport {
            is_valid,
            fields,
            missing,
        }
    }

    /// Validate one declared field, layering the rule's length bounds on
    /// top of the engine result.
    fn evaluate_field(&self, rule: &FieldRule, value: &str) -> FieldReport {
        let mut result = self.validator.validate(value, rule.input_type);

        let len = value.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                result
                    .errors
                    .push(format!("Must be at least {min} characters"));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                result
                    .errors
                    .push(format!("Must be at most {max} characters"));
            }
        }
        result.is_valid = result.errors.is_empty();

        FieldReport {
            field: rule.name.clone(),
            result,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_profile_from_str;
    use input_guard::SQL_PATTERN_MESSAGE;

    fn policy_from_yaml(yaml: &str) -> FormPolicy {
        let profile = load_profile_from_str(yaml).expect("test YAML should parse");
        FormPolicy::new(profile).expect("policy construction should succeed")
    }

    fn submission(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const CUSTOMER_PROFILE: &str = r#"
version: "1.0"
name: "customer-form"
fields:
  - name: "full_name"
    required: true
    max_length: 60
  - name: "email"
    input_type: email
    required: true
  - name: "age"
    input_type: numeric
"#;

    // -- happy path -------------------------------------------------------

    #[test]
    fn clean_submission_passes() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "John O'Brien"),
            ("email", "john@example.com"),
            ("age", "34"),
        ]));

        assert!(report.is_valid);
        assert!(report.missing.is_empty());
        assert_eq!(report.fields.len(), 3);
        // Declared fields come back in profile order.
        assert_eq!(report.fields[0].field, "full_name");
        assert_eq!(report.fields[0].result.sanitized, "John O&#x27;Brien");
    }

    #[test]
    fn optional_field_may_be_absent() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "Jane"),
            ("email", "jane@example.com"),
        ]));
        assert!(report.is_valid);
        assert_eq!(report.fields.len(), 2);
    }

    // -- rejections -------------------------------------------------------

    #[test]
    fn hostile_field_rejects_the_submission() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "'; DROP TABLE users; --"),
            ("email", "x@example.com"),
        ]));

        assert!(!report.is_valid);
        let name_report = &report.fields[0];
        assert_eq!(name_report.result.errors[0], SQL_PATTERN_MESSAGE);
        // The sanitized rendering is still available for safe display.
        assert!(name_report.result.sanitized.contains("&#x27;"));
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[("age", "30")]));

        assert!(!report.is_valid);
        assert_eq!(report.missing, vec!["full_name", "email"]);
    }

    #[test]
    fn length_bounds_apply_after_engine_errors() {
        let yaml = r#"
version: "1.0"
fields:
  - name: "bio"
    min_length: 5
    max_length: 10
"#;
        let policy = policy_from_yaml(yaml);

        let short = policy.evaluate_submission(&submission(&[("bio", "hi")]));
        assert!(!short.is_valid);
        assert_eq!(
            short.fields[0].result.errors,
            vec!["Must be at least 5 characters"]
        );

        let long = policy.evaluate_submission(&submission(&[("bio", "a much too long bio")]));
        assert!(!long.is_valid);
        assert_eq!(
            long.fields[0].result.errors,
            vec!["Must be at most 10 characters"]
        );

        // A hostile short value reports the threat first.
        let hostile = policy.evaluate_submission(&submission(&[("bio", "x'--")]));
        assert_eq!(hostile.fields[0].result.errors[0], SQL_PATTERN_MESSAGE);
        assert_eq!(
            hostile.fields[0].result.errors[1],
            "Must be at least 5 characters"
        );
    }

    // -- unknown fields ---------------------------------------------------

    #[test]
    fn unknown_fields_are_scanned_by_default() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "Jane"),
            ("email", "jane@example.com"),
            ("nickname", "<b>JJ</b>"),
        ]));

        assert!(report.is_valid);
        let nickname = report
            .fields
            .iter()
            .find(|f| f.field == "nickname")
            .expect("unknown field should be reported");
        assert_eq!(nickname.result.sanitized, "&lt;b&gt;JJ&lt;/b&gt;");
    }

    #[test]
    fn unknown_field_threats_are_still_caught() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "Jane"),
            ("email", "jane@example.com"),
            ("extra", "' OR '1'='1"),
        ]));
        assert!(!report.is_valid);
    }

    #[test]
    fn reject_policy_fails_undeclared_fields() {
        let yaml = r#"
version: "1.0"
unknown_fields: reject
fields:
  - name: "comment"
"#;
        let policy = policy_from_yaml(yaml);
        let report = policy.evaluate_submission(&submission(&[
            ("comment", "hello"),
            ("smuggled", "harmless looking"),
        ]));

        assert!(!report.is_valid);
        let smuggled = report
            .fields
            .iter()
            .find(|f| f.field == "smuggled")
            .unwrap();
        assert!(smuggled
            .result
            .errors
            .contains(&UNDECLARED_FIELD_MESSAGE.to_string()));
        // Sanitized rendering survives rejection.
        assert_eq!(smuggled.result.sanitized, "harmless looking");
    }

    // -- report shape -----------------------------------------------------

    #[test]
    fn report_serializes_to_json() {
        let policy = policy_from_yaml(CUSTOMER_PROFILE);
        let report = policy.evaluate_submission(&submission(&[
            ("full_name", "Jane"),
            ("email", "jane@example.com"),
        ]));
        let json = serde_json::to_string(&report).expect("should serialize");
        let back: SubmissionReport = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back.is_valid, report.is_valid);
        assert_eq!(back.fields.len(), report.fields.len());
    }
}
