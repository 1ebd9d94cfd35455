use std::path::PathBuf;

use crate::prelude::{println, *};
use colored::Colorize;
use kdocs_core::normalize::{normalize, NormalizeReport, NormalizerConfig};

use super::{load_document, render_document, write_output, DEFAULT_SPEC_URL};

#[derive(Debug, clap::Args, Clone)]
pub struct FixOptions {
    /// Document to normalize: a local path or an http(s) URL
    #[arg(value_name = "INPUT", env = "KDOCS_SPEC_URL", default_value = DEFAULT_SPEC_URL)]
    pub input: String,

    /// Where to write the normalized document
    #[arg(value_name = "OUTPUT", default_value = "spec/kluster_openapi_fixed.json")]
    pub output: PathBuf,

    /// API key sent as a bearer token when INPUT is a URL
    #[arg(long, env = "KLUSTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output the change report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: FixOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Loading {}", options.input);
    }

    let mut doc = load_document(&options.input, options.api_key.as_deref(), &global).await?;
    let report = normalize(&mut doc, &NormalizerConfig::default())
        .wrap_err_with(|| f!("Failed to normalize {}", options.input))?;
    log::debug!("{report:?}");

    write_output(&options.output, &render_document(&doc)?)?;

    if options.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| eyre!("JSON serialization failed: {e}"))?;
        println!("{text}");
    } else {
        println!("{}", format_report(&report));
        println!(
            "{} {}",
            "Saved to".green().bold(),
            options.output.display().to_string().cyan()
        );
    }

    Ok(())
}

/// One line per change category that actually fired.
fn format_report(report: &NormalizeReport) -> String {
    let mut lines = Vec::new();
    let check = "✓".green();

    for url in &report.server_urls {
        lines.push(f!("{check} Updated server URL to: {url}"));
    }
    if report.info_title_updated {
        lines.push(f!("{check} Updated info.title"));
    }
    if report.info_description_updated {
        lines.push(f!("{check} Updated info.description"));
    }
    lines.push(f!("{check} Updated security scheme to bearer token"));
    if report.untyped_schemas_fixed > 0 {
        lines.push(f!(
            "{check} Fixed {} schema(s) missing type",
            report.untyped_schemas_fixed
        ));
    }
    if report.token_bias_backfilled {
        lines.push(f!("{check} Fixed LogitBias schema"));
    }
    if report.messages_flattened {
        lines.push(f!("{check} Flattened chat completion messages schema"));
    }
    if report.walker_fixes > 0 {
        lines.push(f!("{check} Applied {} schema fixes", report.walker_fixes));
    }
    for rename in &report.renamed_tags {
        lines.push(f!("{check} Renamed tag '{}' to '{}'", rename.from, rename.to));
    }
    for tag in &report.removed_tags {
        lines.push(f!("{check} Removed tag '{tag}'"));
    }
    if report.endpoint_tag_fixes > 0 {
        lines.push(f!(
            "{check} Fixed {} tag references in endpoints",
            report.endpoint_tag_fixes
        ));
    }
    for endpoint in &report.removed_endpoints {
        lines.push(f!("{check} Removed undocumented endpoint: {endpoint}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdocs_core::tags::TagRename;

    #[test]
    fn test_format_report_lists_fired_categories() {
        colored::control::set_override(false);
        let report = NormalizeReport {
            server_urls: vec!["https://api.kluster.ai/v1".to_string()],
            untyped_schemas_fixed: 2,
            walker_fixes: 3,
            renamed_tags: vec![TagRename {
                from: "chatCompletions".to_string(),
                to: "Chat completions".to_string(),
            }],
            ..Default::default()
        };

        let text = format_report(&report);

        assert_eq!(
            text,
            [
                "✓ Updated server URL to: https://api.kluster.ai/v1",
                "✓ Updated security scheme to bearer token",
                "✓ Fixed 2 schema(s) missing type",
                "✓ Applied 3 schema fixes",
                "✓ Renamed tag 'chatCompletions' to 'Chat completions'",
            ]
            .join("\n")
        );
    }
}
