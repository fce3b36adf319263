//! Low-level scanner that checks a text string against the threat pattern
//! library and returns structured findings.

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::patterns::PATTERNS;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing a [`ThreatScanner`].
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("failed to compile regex pattern: {0}")]
    RegexCompile(#[from] regex::Error),
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// A single match produced by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// The `name` field of the [`ThreatPattern`](crate::patterns::ThreatPattern) that matched.
    pub pattern_name: String,
    /// Human-readable category string (e.g. `"Tautology"`).
    pub category: String,
    /// The literal substring that triggered the match.
    pub matched_text: String,
    /// Byte offset of the match within the scanned text.
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// ThreatScanner
// ---------------------------------------------------------------------------

/// Compiled scanner backed by a [`RegexSet`] for fast multi-pattern matching,
/// with individual [`Regex`] objects kept alongside for extracting match
/// details.
///
/// The scanner always evaluates the raw, untrimmed input; callers must not
/// pre-escape or normalise text before scanning, since escaping can break
/// the keyword adjacency the patterns rely on.
pub struct ThreatScanner {
    /// Used to cheaply determine *which* patterns match.
    regex_set: RegexSet,
    /// Parallel vec of individually compiled regexes (same order as
    /// [`PATTERNS`]) for extracting match positions and text.
    individual: Vec<Regex>,
}

impl ThreatScanner {
    /// Compile every pattern in the library and return a ready-to-use scanner.
    pub fn new() -> Result<Self, ScannerError> {
        let pattern_strings: Vec<&str> = PATTERNS.iter().map(|p| p.pattern).collect();

        let regex_set = RegexSet::new(&pattern_strings)?;

        let individual = pattern_strings
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            regex_set,
            individual,
        })
    }

    /// Boolean predicate: does `text` plausibly contain an injection payload?
    ///
    /// Uses the [`RegexSet`] alone, skipping per-match detail extraction.
    /// The empty string matches nothing and returns `false`.
    pub fn is_threat(&self, text: &str) -> bool {
        self.regex_set.is_match(text)
    }

    /// Scan `text` and return all findings.
    ///
    /// The returned [`Vec`] is sorted by byte offset so that callers can
    /// process matches left-to-right.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        let matching_indices = self.regex_set.matches(text);

        let mut findings: Vec<Finding> = Vec::new();

        for idx in matching_indices.into_iter() {
            let pattern_def = &PATTERNS[idx];
            let re = &self.individual[idx];

            // A single pattern may match multiple times in the text.
            for m in re.find_iter(text) {
                findings.push(Finding {
                    pattern_name: pattern_def.name.to_string(),
                    category: pattern_def.category.to_string(),
                    matched_text: m.as_str().to_string(),
                    offset: m.start(),
                });
            }
        }

        findings.sort_by_key(|f| f.offset);
        findings
    }

    /// Returns the number of patterns in the compiled set.
    pub fn pattern_count(&self) -> usize {
        self.individual.len()
    }
}
