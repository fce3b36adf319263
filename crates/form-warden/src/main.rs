mod cli;
mod config;

use std::collections::BTreeMap;
use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use audit_trail::{AuditEntry, AuditEventType, AuditSink, AuditSource};
use form_policy::{loader, FormPolicy, SubmissionReport};
use input_guard::{validate_input, InputType, SQL_PATTERN_MESSAGE};

use crate::cli::Cli;

/// Component name used in audit entries emitted by this binary.
const COMPONENT: &str = "form-warden";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let mut cfg = config::load(&cli.config)?;

    if let Some(ref profile) = cli.profile {
        cfg.profile_file = profile.clone();
    }
    if let Some(ref audit_log) = cli.audit_log {
        cfg.logging.audit_log_path = audit_log.clone();
    }

    // 3. Init tracing-subscriber with JSON format.  Logs go to stderr so
    //    stdout stays a clean stream of report objects.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // 4. One-shot mode: validate a single value, no profile or audit needed.
    if let Some(ref text) = cli.check {
        let result = validate_input(text, InputType::Text);
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.is_valid {
            std::process::exit(1);
        }
        return Ok(());
    }

    let input_path = cli
        .input
        .context("either --check <TEXT> or --input <FILE> must be given")?;

    info!(
        config_file = %cli.config.display(),
        profile_file = %cfg.profile_file.display(),
        input = %input_path.display(),
        "form-warden starting"
    );

    // 5. Start audit logger.
    let (audit, audit_handle) = AuditSink::start(&cfg.logging.audit_log_path)
        .await
        .context("failed to start audit logger")?;

    audit
        .log(AuditEntry::new(
            AuditEventType::ProcessStarted,
            AuditSource::new(COMPONENT),
            serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "config_file": cli.config.display().to_string(),
            }),
        ))
        .await;

    // 6. Load the form profile and build the policy.
    let profile = loader::load_profile(&cfg.profile_file)
        .context("failed to load form profile")?;
    let profile_name = profile
        .name
        .clone()
        .unwrap_or_else(|| "<unnamed>".to_string());
    let policy = FormPolicy::new(profile).context("failed to initialize form policy")?;

    info!(
        profile_file = %cfg.profile_file.display(),
        ?policy,
        "form policy loaded"
    );

    audit
        .log(AuditEntry::new(
            AuditEventType::ProfileLoaded,
            AuditSource::new(COMPONENT).with_form(profile_name.as_str()),
            serde_json::json!({
                "profile_file": cfg.profile_file.display().to_string(),
                "num_fields": policy.profile().fields.len(),
            }),
        ))
        .await;

    // 7. Stream submissions: one flat JSON object per line.
    let file = std::fs::File::open(&input_path)
        .with_context(|| format!("failed to open submissions file: {}", input_path.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut total = 0usize;
    let mut rejected = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let values: BTreeMap<String, String> = serde_json::from_str(&line).with_context(|| {
            format!("line {line_no}: submissions must be flat JSON objects of strings")
        })?;

        total += 1;
        audit
            .log(AuditEntry::new(
                AuditEventType::SubmissionReceived,
                AuditSource::new(COMPONENT).with_form(profile_name.as_str()),
                serde_json::json!({"line": line_no, "num_fields": values.len()}),
            ))
            .await;

        let report = policy.evaluate_submission(&values);
        audit_report(&audit, &profile_name, line_no, &report).await;

        if !report.is_valid {
            rejected += 1;
        }

        println!("{}", serde_json::to_string(&report)?);
    }

    info!(total, rejected, "finished processing submissions");

    // 8. Log shutdown and drain the audit stream.
    audit
        .log(AuditEntry::new(
            AuditEventType::ProcessStopped,
            AuditSource::new(COMPONENT),
            serde_json::json!({"total": total, "rejected": rejected}),
        ))
        .await;

    drop(audit);
    audit_handle.await.ok();

    if rejected > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Emit the audit entries for one evaluated submission: a `ThreatDetected`
/// entry per field the scanner flagged, then the accept/reject verdict.
/// Only sanitized renderings are written to the audit stream.
async fn audit_report(
    audit: &AuditSink,
    profile_name: &str,
    line_no: usize,
    report: &SubmissionReport,
) {
    for field in &report.fields {
        if field
            .result
            .errors
            .iter()
            .any(|e| e == SQL_PATTERN_MESSAGE)
        {
            audit
                .log(AuditEntry::new(
                    AuditEventType::ThreatDetected,
                    AuditSource::new(COMPONENT)
                        .with_form(profile_name)
                        .with_field(field.field.as_str()),
                    serde_json::json!({
                        "line": line_no,
                        "sanitized": field.result.sanitized,
                    }),
                ))
                .await;
        }
    }

    let event_type = if report.is_valid {
        AuditEventType::SubmissionAccepted
    } else {
        AuditEventType::SubmissionRejected
    };

    audit
        .log(AuditEntry::new(
            event_type,
            AuditSource::new(COMPONENT).with_form(profile_name),
            serde_json::json!({
                "line": line_no,
                "missing": report.missing,
                "invalid_fields": report
                    .fields
                    .iter()
                    .filter(|f| !f.result.is_valid)
                    .map(|f| f.field.as_str())
                    .collect::<Vec<_>>(),
            }),
        ))
        .await;
}
