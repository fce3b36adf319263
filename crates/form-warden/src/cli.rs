use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "form-warden",
    version,
    about = "Validation and sanitization gate for untrusted form input"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Path to the form profile (overrides config file setting)
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Audit log path (overrides config file setting)
    #[arg(long)]
    pub audit_log: Option<PathBuf>,

    /// Validate a single value as free text and print the result as JSON
    #[arg(long, value_name = "TEXT", conflicts_with = "input")]
    pub check: Option<String>,

    /// JSON-lines file of submissions to evaluate (one flat object of
    /// field/value strings per line)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
