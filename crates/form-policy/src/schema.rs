use input_guard::InputType;
use serde::{Deserialize, Serialize};

/// Top-level form profile loaded from a YAML file.
///
/// A profile declares, for one logical form, which fields a submission may
/// carry and how each is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormProfile {
    /// Schema version; currently must be "1.0".
    pub version: String,
    /// Optional human-readable profile name (e.g. "comment-form").
    #[serde(default)]
    pub name: Option<String>,
    /// What to do with submitted fields the profile does not declare.
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
    /// Declared fields, evaluated in order.
    pub fields: Vec<FieldRule>,
}

/// Handling of submitted fields that have no [`FieldRule`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Validate the value with free-text semantics (threat scan + sanitize).
    Scan,
    /// Reject the submission.
    Reject,
}

impl Default for UnknownFieldPolicy {
    fn default() -> Self {
        Self::Scan
    }
}

/// Validation rules for a single declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    /// Field name as submitted (unique within the profile).
    pub name: String,
    /// Optional display label used in user-facing messages.
    #[serde(default)]
    pub label: Option<String>,
    /// Logical kind; selects the engine's type-specific format checks.
    #[serde(default)]
    pub input_type: InputType,
    /// Whether the field must be present in every submission.
    #[serde(default)]
    pub required: bool,
    /// Minimum length in characters, checked after the engine pass.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length in characters, checked after the engine pass.
    #[serde(default)]
    pub max_length: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_profile() {
        let yaml = r#"
version: "1.0"
fields: []
"#;
        let profile: FormProfile = serde_yml::from_str(yaml).unwrap();
        assert_eq!(profile.version, "1.0");
        assert!(profile.name.is_none());
        assert_eq!(profile.unknown_fields, UnknownFieldPolicy::Scan);
        assert!(profile.fields.is_empty());
    }

    #[test]
    fn deserialize_full_profile() {
        let yaml = r#"
version: "1.0"
name: "customer-form"
unknown_fields: reject
fields:
  - name: "full_name"
    label: "Full name"
    input_type: text
    required: true
    min_length: 1
    max_length: 120
  - name: "email"
    input_type: email
    required: true
  - name: "age"
    input_type: numeric
"#;
        let profile: FormProfile = serde_yml::from_str(yaml).unwrap();
        assert_eq!(profile.name.as_deref(), Some("customer-form"));
        assert_eq!(profile.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(profile.fields.len(), 3);

        let name = &profile.fields[0];
        assert_eq!(name.name, "full_name");
        assert_eq!(name.label.as_deref(), Some("Full name"));
        assert_eq!(name.input_type, InputType::Text);
        assert!(name.required);
        assert_eq!(name.min_length, Some(1));
        assert_eq!(name.max_length, Some(120));

        assert_eq!(profile.fields[1].input_type, InputType::Email);
        assert_eq!(profile.fields[2].input_type, InputType::Numeric);
        assert!(!profile.fields[2].required);
    }

    #[test]
    fn field_defaults_to_optional_free_text() {
        let yaml = r#"
version: "1.0"
fields:
  - name: "note"
"#;
        let profile: FormProfile = serde_yml::from_str(yaml).unwrap();
        let rule = &profile.fields[0];
        assert_eq!(rule.input_type, InputType::Text);
        assert!(!rule.required);
        assert!(rule.min_length.is_none());
        assert!(rule.max_length.is_none());
    }
}
