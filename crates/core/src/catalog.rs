//! Model catalog entries derived from the `/v1/models?extended=true` listing.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One model as returned by the catalog endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model_purpose: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub output_length: Option<u64>,
    #[serde(default)]
    pub tools_supported: Option<bool>,
}

/// The `{"data": [...]}` envelope around the listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelListResponse {
    #[serde(default)]
    pub data: Vec<ModelDescriptor>,
}

/// A catalog entry ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
    pub slug: String,
    pub supports_vision: bool,
    pub fine_tuning: bool,
    pub tools_supported: bool,
    pub context_length: String,
    pub output_length: String,
}

/// Result of [`build_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub models: Vec<ModelInfo>,
    /// Ids dropped because an earlier entry already used them.
    pub duplicate_ids: Vec<String>,
    /// `(base, assigned)` for every slug that needed a numeric suffix.
    pub renamed_slugs: Vec<(String, String)>,
}

/// Build catalog entries in listing order, skipping embeddings models and
/// repeated ids.
pub fn build_catalog(models: &[ModelDescriptor]) -> Catalog {
    let mut catalog = Catalog::default();
    let mut seen_ids = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for model in models {
        if model.model_purpose.as_deref() == Some("embeddings") {
            continue;
        }
        if !seen_ids.insert(model.id.as_str()) {
            catalog.duplicate_ids.push(model.id.clone());
            continue;
        }

        let base_slug = convert_to_slug(&model.id);
        let mut slug = base_slug.clone();
        let mut counter = 1;
        while seen_slugs.contains(&slug) {
            slug = format!("{base_slug}-{counter}");
            counter += 1;
        }
        if slug != base_slug {
            catalog.renamed_slugs.push((base_slug, slug.clone()));
        }
        seen_slugs.insert(slug.clone());

        catalog.models.push(ModelInfo {
            id: model.id.clone(),
            display_name: display_name(model),
            slug,
            supports_vision: model.model_purpose.as_deref() == Some("multimodal")
                || model.tags.iter().any(|t| t == "vision"),
            fine_tuning: model.tags.iter().any(|t| t == "fine-tunable"),
            tools_supported: model.tools_supported.unwrap_or(false),
            context_length: format_token_length(model.context_length.unwrap_or(0)),
            output_length: format_token_length(model.output_length.unwrap_or(0)),
        });
    }

    catalog
}

/// Look up a catalog entry by its full id.
pub fn find_model<'a>(models: &'a [ModelInfo], model_id: &str) -> Result<&'a ModelInfo, String> {
    models
        .iter()
        .find(|m| m.id == model_id)
        .ok_or_else(|| format!("Model not found in catalog: {model_id}"))
}

fn last_segment(model_id: &str) -> &str {
    model_id.rsplit('/').next().unwrap_or(model_id)
}

/// The API `name`, or a readable name derived from the id.
pub fn display_name(model: &ModelDescriptor) -> String {
    if let Some(name) = &model.name {
        return name.clone();
    }

    static RE_HUMP: OnceLock<Regex> = OnceLock::new();
    let re_hump = RE_HUMP.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap());

    re_hump
        .replace_all(last_segment(&model.id), "$1 $2")
        .replace(['-', '_'], " ")
}

/// File-name friendly slug from the last segment of a model id.
pub fn convert_to_slug(model_id: &str) -> String {
    static RE_SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re_separators = RE_SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());

    let lowered = last_segment(model_id).to_lowercase();
    re_separators
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// `1M`, `<n>k` or the plain number.
pub fn format_token_length(length: u64) -> String {
    if length >= 1_000_000 {
        "1M".to_string()
    } else if length >= 1000 {
        format!("{}k", length / 1000)
    } else {
        length.to_string()
    }
}
