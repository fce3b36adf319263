//! Threat pattern library.
//!
//! Contains the static catalogue of regex patterns used to recognise common
//! SQL and NoSQL injection shapes in untrusted text.  Each entry carries a
//! human-readable name, a [`ThreatCategory`] for grouping/reporting, and a
//! regex string that is compiled at scanner-construction time.
//!
//! Every pattern pairs a structural marker (quote, semicolon, comment
//! opener, paren, or brace) with a keyword or tautology shape, so that a
//! lone apostrophe (`O'Brien`), ampersand, or ordinary punctuation never
//! fires a category on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Broad classification of the injection technique a pattern targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatCategory {
    /// `UNION SELECT` style set-based data extraction.
    SetExtraction,
    /// Schema or data destruction (`DROP TABLE`, `DELETE FROM`, ...).
    Destruction,
    /// Boolean tautologies that make an injected condition always true.
    Tautology,
    /// A quote or semicolon terminating a statement, followed by a comment
    /// that swallows the remainder of the original query.
    CommentTermination,
    /// Time-based blind injection (`WAITFOR DELAY`, `SLEEP(n)`).
    TimeDelay,
    /// Stored-procedure execution or impersonation (`EXEC xp_*`, `AS LOGIN`).
    PrivilegedExec,
    /// Object literals smuggling `$`-prefixed NoSQL query operators.
    NoSqlOperator,
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetExtraction => write!(f, "SetExtraction"),
            Self::Destruction => write!(f, "Destruction"),
            Self::Tautology => write!(f, "Tautology"),
            Self::CommentTermination => write!(f, "CommentTermination"),
            Self::TimeDelay => write!(f, "TimeDelay"),
            Self::PrivilegedExec => write!(f, "PrivilegedExec"),
            Self::NoSqlOperator => write!(f, "NoSqlOperator"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern definition
// ---------------------------------------------------------------------------

/// A single detection pattern.
pub struct ThreatPattern {
    /// Short, snake_case identifier used in logs and findings.
    pub name: &'static str,
    /// The family of injection technique this pattern belongs to.
    pub category: ThreatCategory,
    /// A regex string (compiled lazily by [`crate::scanner::ThreatScanner`]).
    pub pattern: &'static str,
}

// ---------------------------------------------------------------------------
// Pattern catalogue
// ---------------------------------------------------------------------------

/// The built-in pattern library.
///
/// Patterns are kept as a static slice so that they are available at zero
/// runtime cost until the scanner compiles them.  The `regex` crate's
/// automaton-based engine guarantees each of these runs in linear time over
/// the input, so scanning is safe on the request path.
pub static PATTERNS: &[ThreatPattern] = &[
    // ---- Set-based extraction ------------------------------------------
    ThreatPattern {
        name: "union_select",
        category: ThreatCategory::SetExtraction,
        pattern: r"(?i)\bunion\s+(all\s+)?select\b",
    },
    // ---- Schema / data destruction -------------------------------------
    ThreatPattern {
        name: "drop_alter_truncate_table",
        category: ThreatCategory::Destruction,
        pattern: r"(?i)\b(drop|alter|truncate)\s+table\b",
    },
    ThreatPattern {
        name: "delete_from",
        category: ThreatCategory::Destruction,
        pattern: r"(?i)\bdelete\s+from\b",
    },
    // ---- Boolean tautology ---------------------------------------------
    ThreatPattern {
        name: "quoted_tautology",
        category: ThreatCategory::Tautology,
        pattern: r#"(?i)['"]\s*(or|and)\s+['"]?\w+['"]?\s*=\s*['"]?\w+"#,
    },
    ThreatPattern {
        name: "bare_or_tautology",
        category: ThreatCategory::Tautology,
        pattern: r"(?i)\bor\s+1\s*=\s*1\b",
    },
    // ---- Statement termination + comment --------------------------------
    ThreatPattern {
        name: "comment_after_quote",
        category: ThreatCategory::CommentTermination,
        pattern: r#"['";]\s*(--|/\*|#)"#,
    },
    // ---- Time-based blind injection -------------------------------------
    ThreatPattern {
        name: "waitfor_delay",
        category: ThreatCategory::TimeDelay,
        pattern: r"(?i)\bwaitfor\s+delay\b",
    },
    ThreatPattern {
        name: "sleep_call",
        category: ThreatCategory::TimeDelay,
        // The digit requirement keeps prose like "sleep (eight hours)" out.
        pattern: r"(?i)\bsleep\s*\(\s*\d",
    },
    // ---- Privileged execution -------------------------------------------
    ThreatPattern {
        name: "exec_stored_procedure",
        category: ThreatCategory::PrivilegedExec,
        pattern: r"(?i)\bexec(ute)?\s+(xp|sp)_\w+",
    },
    ThreatPattern {
        name: "execute_as_login",
        category: ThreatCategory::PrivilegedExec,
        pattern: r"(?i)\bexec(ute)?\s+as\s+login\b",
    },
    // ---- NoSQL operator injection ---------------------------------------
    ThreatPattern {
        name: "nosql_operator_key",
        category: ThreatCategory::NoSqlOperator,
        pattern: r#"(?i)\{\s*['"]?\$(gt|gte|lt|lte|ne|eq|in|nin|nor|not|or|and|regex|where|exists|expr|elemmatch|mod|size|type)\b['"]?\s*:"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        for pat in PATTERNS {
            regex::Regex::new(pat.pattern)
                .unwrap_or_else(|e| panic!("pattern '{}' failed to compile: {e}", pat.name));
        }
    }

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for pat in PATTERNS {
            assert!(
                seen.insert(pat.name),
                "duplicate pattern name: {}",
                pat.name
            );
        }
    }

    #[test]
    fn every_category_is_represented() {
        let categories = [
            ThreatCategory::SetExtraction,
            ThreatCategory::Destruction,
            ThreatCategory::Tautology,
            ThreatCategory::CommentTermination,
            ThreatCategory::TimeDelay,
            ThreatCategory::PrivilegedExec,
            ThreatCategory::NoSqlOperator,
        ];
        for cat in categories {
            assert!(
                PATTERNS.iter().any(|p| p.category == cat),
                "no pattern registered for category {cat}"
            );
        }
    }
}
