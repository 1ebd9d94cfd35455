use crate::prelude::{println, *};
use colored::Colorize;
use kdocs_core::catalog::{build_catalog, find_model, Catalog, ModelInfo, ModelListResponse};

use super::DEFAULT_MODELS_URL;

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only show this model id
    #[arg(long)]
    pub model_id: Option<String>,

    /// Catalog URL
    #[arg(long, env = "KDOCS_MODELS_URL", default_value = DEFAULT_MODELS_URL)]
    pub url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "KLUSTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Fetching {}", options.url);
    }

    let mut models = list_models_data(&options.url, options.api_key.as_deref(), &global).await?;

    if let Some(model_id) = &options.model_id {
        let model = find_model(&models, model_id).map_err(|e| eyre!(e))?.clone();
        models = vec![model];
    }

    if options.json {
        let text = serde_json::to_string_pretty(&models)
            .map_err(|e| eyre!("JSON serialization failed: {e}"))?;
        println!("{text}");
    } else {
        output_table(&models);
    }

    Ok(())
}

/// Fetch the catalog listing and derive the entries the docs cover.
pub async fn list_models_data(
    url: &str,
    api_key: Option<&str>,
    global: &crate::Global,
) -> Result<Vec<ModelInfo>> {
    let client = crate::http::client(global.timeout)?;
    let body = crate::http::fetch_text(&client, url, api_key).await?;
    let listing: ModelListResponse =
        serde_json::from_str(&body).map_err(|e| eyre!("Failed to parse model listing: {e}"))?;

    let catalog = build_catalog(&listing.data);
    log_catalog_notes(&catalog);

    Ok(catalog.models)
}

fn log_catalog_notes(catalog: &Catalog) {
    for id in &catalog.duplicate_ids {
        log::warn!("Skipping duplicate model ID: {id}");
    }
    for (base, assigned) in &catalog.renamed_slugs {
        log::warn!("Found duplicate slug. Changed {base} to {assigned}");
    }
}

fn yes_no(flag: bool) -> String {
    if flag {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn output_table(models: &[ModelInfo]) {
    if models.is_empty() {
        println!("{}", "No models found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID", "NAME", "SLUG", "CONTEXT", "OUTPUT", "VISION", "FINE-TUNING", "TOOLS"]);

    for model in models {
        table.add_row(prettytable::row![
            model.id,
            model.display_name,
            model.slug,
            model.context_length,
            model.output_length,
            yes_no(model.supports_vision),
            yes_no(model.fine_tuning),
            yes_no(model.tools_supported),
        ]);
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no() {
        colored::control::set_override(false);
        assert_eq!(yes_no(true), "✓");
        assert_eq!(yes_no(false), "✗");
    }
}
