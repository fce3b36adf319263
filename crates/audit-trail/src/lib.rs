//! # audit-trail
//!
//! Append-only structured JSON-lines audit logging for the form-warden
//! gate.  Rejected input may need to be audited later, so every
//! acceptance/rejection/threat event is recorded — always carrying the
//! sanitized rendering of the offending value, never the raw text.
//!
//! Each audit event is serialised as a single newline-terminated JSON
//! object and appended to a log file, producing a
//! [JSON Lines](https://jsonlines.org/) stream that is easy to ship,
//! parse, and replay.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audit_trail::{AuditEntry, AuditEventType, AuditSink, AuditSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, _handle) = AuditSink::start("/var/log/form-warden/audit.jsonl").await?;
//!
//! sink.log(AuditEntry::new(
//!     AuditEventType::ProcessStarted,
//!     AuditSource::new("form-warden"),
//!     serde_json::json!({"version": "0.1.0"}),
//! ))
//! .await;
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

// Re-export primary public types at the crate root for convenience.
pub use entry::{AuditEntry, AuditEventType, AuditSource};
pub use sink::AuditSink;
pub use writer::{AuditWriteError, AuditWriter};
