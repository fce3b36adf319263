use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::schema::FormProfile;

/// Load a [`FormProfile`] from a YAML file on disk.
///
/// Validates the profile after deserialization (version check, unique field
/// names, coherent length bounds).
pub fn load_profile(path: impl AsRef<Path>) -> Result<FormProfile> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form profile: {}", path.display()))?;
    load_profile_from_str(&contents)
        .with_context(|| format!("failed to parse form profile: {}", path.display()))
}

/// Parse and validate a [`FormProfile`] from a YAML string.
///
/// This is the primary entry point used in tests.
pub fn load_profile_from_str(yaml: &str) -> Result<FormProfile> {
    let profile: FormProfile =
        serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&profile)?;
    Ok(profile)
}

/// Run post-deserialization validation checks.
fn validate(profile: &FormProfile) -> Result<()> {
    // Version gate
    if profile.version != "1.0" {
        bail!(
            "unsupported profile version '{}'; only '1.0' is supported",
            profile.version
        );
    }

    // Field names must be unique and non-empty
    let mut seen = HashSet::new();
    for field in &profile.fields {
        if field.name.is_empty() {
            bail!("field name must not be empty");
        }
        if !seen.insert(&field.name) {
            bail!("duplicate field name: '{}'", field.name);
        }
        if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
            if min > max {
                bail!(
                    "field '{}': min_length {} exceeds max_length {}",
                    field.name,
                    min,
                    max
                );
            }
        }
    }

    Ok(())
}
