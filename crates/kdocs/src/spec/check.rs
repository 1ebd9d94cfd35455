use crate::prelude::{println, *};
use colored::Colorize;
use kdocs_core::check::{check_document, CheckReport};
use kdocs_core::normalize::NormalizerConfig;

use super::load_document;

/// Warnings shown in the formatted view; `--json` carries all of them.
const WARNINGS_SHOWN: usize = 3;

#[derive(Debug, clap::Args, Clone)]
pub struct CheckOptions {
    /// Document to check: a local path or an http(s) URL
    #[arg(value_name = "INPUT", default_value = "spec/kluster_openapi_fixed.json")]
    pub input: String,

    /// API key sent as a bearer token when INPUT is a URL
    #[arg(long, env = "KLUSTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output the findings as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: CheckOptions, global: crate::Global) -> Result<()> {
    let doc = load_document(&options.input, options.api_key.as_deref(), &global).await?;
    let report = check_document(&doc, &NormalizerConfig::default());
    log::debug!("{} findings in {}", report.findings.len(), options.input);

    if options.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| eyre!("JSON serialization failed: {e}"))?;
        println!("{text}");
    } else {
        println!("{}", format_report(&report, &options.input));
    }

    // Findings are reported, not fatal.
    Ok(())
}

fn format_report(report: &CheckReport, input: &str) -> String {
    let errors: Vec<_> = report.errors().collect();
    let warnings: Vec<_> = report.warnings().collect();
    let mut result = String::new();

    result.push_str(&f!("{}\n", "=== IMPORTER COMPATIBILITY CHECK ===".bright_cyan().bold()));
    result.push_str(&f!("Checking: {input}\n\n"));

    result.push_str(&f!("{} {}\n", "ERRORS:".red().bold(), errors.len()));
    result.push_str(&f!("{} {}\n", "WARNINGS:".yellow().bold(), warnings.len()));
    result.push_str(&f!("{} {}\n", "DATA SCHEMAS:".cyan().bold(), report.data_schemas()));

    if errors.is_empty() {
        result.push_str(&f!("\n{}\n", "No critical errors found!".green()));
    } else {
        result.push_str(&f!("\n{}\n", "Critical errors:".red().bold()));
        for finding in &errors {
            result.push_str(&f!("  {}: {}\n", finding.location.bright_white(), finding.issue));
            result.push_str(&f!("     Importer: {}\n", finding.message));
        }
    }

    if !warnings.is_empty() {
        result.push_str(&f!("\n{}\n", "Warnings:".yellow().bold()));
        for finding in warnings.iter().take(WARNINGS_SHOWN) {
            result.push_str(&f!(
                "  [{}] {}: {}\n",
                finding.severity,
                finding.location.bright_white(),
                finding.issue
            ));
        }
    }

    result.push_str(&f!(
        "\n{} {} errors, {} warnings",
        "SUMMARY:".bold(),
        errors.len(),
        warnings.len()
    ));
    if errors.is_empty() {
        result.push_str("\n   Document should import cleanly.");
    }

    result
}
