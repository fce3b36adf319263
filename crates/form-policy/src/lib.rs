//! # form-policy
//!
//! Declarative form profiles for the form-warden gate.  This crate loads
//! YAML profiles describing the fields a submission may carry, and
//! evaluates whole submissions against them using the
//! [`input-guard`](input_guard) engine for every field.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use form_policy::{loader, FormPolicy};
//! use std::collections::BTreeMap;
//!
//! let profile = loader::load_profile("profile.yaml").unwrap();
//! let policy = FormPolicy::new(profile).unwrap();
//! let report = policy.evaluate_submission(&BTreeMap::new());
//! println!("{:?}", report.is_valid);
//! ```

mod evaluator;
pub mod loader;
mod schema;

// Re-export primary public API at crate root.
pub use evaluator::{FieldReport, FormPolicy, SubmissionReport, UNDECLARED_FIELD_MESSAGE};
pub use schema::{FieldRule, FormProfile, UnknownFieldPolicy};
