//! The OpenAPI document normalizer: targeted fixups plus the generic walker pass.
//!
//! [`normalize`] runs, in order: server URL rewrite, info rewrite, security
//! scheme replacement, typing of untyped component schemas, token-bias model
//! backfill, chat message flattening, the walker fixups from
//! [`crate::fixups`], tag relabelling, endpoint tag relabelling and
//! undocumented endpoint pruning. Later steps rely on the
//! shapes produced by earlier ones, so the order is fixed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fixups::{is_truthy, WALKER_FIXUPS};
use crate::tags::{
    normalize_endpoint_tags, normalize_tag_list, prune_undocumented_endpoints, RemovedEndpoint,
    TagRename,
};
use crate::walker::{apply_fixes, JsonObject};

pub const DEFAULT_INFO_TITLE: &str = "Get started with the kluster.ai API";

pub const DEFAULT_INFO_DESCRIPTION: &str = "The kluster.ai API provides a simple and scalable way to work with Large Language Models (LLMs). It's compatible with OpenAI’s API and SDKs, allowing easy integration into your existing workflows with minimal code changes.\n\nVisit the [Get an API key](https://docs.kluster.ai/get-started/get-api-key/) page to create an account and generate your API key.\n\nTo use the API playground, enter your API key under **Authentication** in the **Bearer token** field on the right side of the page.\n\nYou're now ready to make test API calls. Choose an endpoint and click **Test Request** to send a request. Your API key will be automatically included—just update the parameters as needed and submit.\n\nNote that the API playground does not store your API key between sessions. Be mindful of request limits based on your plan tier when testing.";

/// Name of the bearer scheme installed by [`install_bearer_auth`].
pub const BEARER_SCHEME: &str = "bearerAuth";

/// Everything the normalizer needs to know about the target document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Host that must not leak into published server URLs.
    pub internal_host: String,
    /// Host the published server URLs point at.
    pub public_host: String,
    pub info_title: String,
    pub info_description: String,
    /// Schema replaced with a numeric map when it has no properties.
    pub token_bias_schema: String,
    /// Path whose request `messages` items get flattened.
    pub chat_path: String,
    /// Tag dropped from the tag list and from every operation.
    pub internal_tag: String,
    /// Tag labels kept fully upper-cased.
    pub abbreviations: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            internal_host: "platform.kluster.ai".to_string(),
            public_host: "api.kluster.ai".to_string(),
            info_title: DEFAULT_INFO_TITLE.to_string(),
            info_description: DEFAULT_INFO_DESCRIPTION.to_string(),
            token_bias_schema: "LogitBias".to_string(),
            chat_path: "/v1/chat/completions".to_string(),
            internal_tag: "portal".to_string(),
            abbreviations: vec!["MCP".to_string()],
        }
    }
}

/// What a [`normalize`] run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// New URL of every rewritten server entry.
    pub server_urls: Vec<String>,
    pub info_title_updated: bool,
    pub info_description_updated: bool,
    pub token_bias_backfilled: bool,
    /// Component schemas given `"type": "object"` because they had
    /// properties but no type.
    pub untyped_schemas_fixed: usize,
    pub messages_flattened: bool,
    /// Sum of the walker fixups across the whole tree.
    pub walker_fixes: usize,
    pub renamed_tags: Vec<TagRename>,
    pub removed_tags: Vec<String>,
    pub endpoint_tag_fixes: usize,
    pub removed_endpoints: Vec<RemovedEndpoint>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("document root must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Normalize a parsed document in place.
pub fn normalize(
    doc: &mut Value,
    config: &NormalizerConfig,
) -> Result<NormalizeReport, NormalizeError> {
    let Some(root) = doc.as_object_mut() else {
        return Err(NormalizeError::NotAnObject(kind_of(doc)));
    };

    let mut report = NormalizeReport {
        server_urls: rewrite_server_urls(root, &config.internal_host, &config.public_host),
        ..Default::default()
    };

    (report.info_title_updated, report.info_description_updated) =
        rewrite_info(root, &config.info_title, &config.info_description);

    install_bearer_auth(root);
    report.untyped_schemas_fixed = type_untyped_schemas(root);
    report.token_bias_backfilled = backfill_token_bias_model(root, &config.token_bias_schema);
    report.messages_flattened = flatten_chat_messages(root, &config.chat_path);

    let mut fixes = WALKER_FIXUPS;
    report.walker_fixes = apply_fixes(doc, &mut fixes);

    // The walker needed the whole Value; re-borrow the root for the rest.
    let Some(root) = doc.as_object_mut() else {
        return Err(NormalizeError::NotAnObject(kind_of(doc)));
    };

    let tag_changes = normalize_tag_list(root, &config.internal_tag, &config.abbreviations);
    report.renamed_tags = tag_changes.renamed;
    report.removed_tags = tag_changes.removed;
    report.endpoint_tag_fixes =
        normalize_endpoint_tags(root, &config.internal_tag, &config.abbreviations);
    report.removed_endpoints = prune_undocumented_endpoints(root);

    Ok(report)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Point server entries at the public host. Returns the rewritten URLs.
pub fn rewrite_server_urls(doc: &mut JsonObject, internal_host: &str, public_host: &str) -> Vec<String> {
    let mut updated = Vec::new();

    let Some(Value::Array(servers)) = doc.get_mut("servers") else {
        return updated;
    };

    for server in servers.iter_mut() {
        let Some(Value::String(url)) = server.get_mut("url") else {
            continue;
        };
        if url.contains(internal_host) {
            *url = url.replace(internal_host, public_host);
            updated.push(url.clone());
        }
    }

    updated
}

/// Replace `info.title` / `info.description` when present.
///
/// Returns whether each value changed. Missing keys are not created.
pub fn rewrite_info(doc: &mut JsonObject, title: &str, description: &str) -> (bool, bool) {
    let Some(Value::Object(info)) = doc.get_mut("info") else {
        return (false, false);
    };

    let mut replace = |key: &str, text: &str| match info.get_mut(key) {
        Some(value) if value.as_str() != Some(text) => {
            *value = Value::String(text.to_string());
            true
        }
        _ => false,
    };

    (replace("title", title), replace("description", description))
}

/// Make a single bearer-token scheme the only authentication in the document.
pub fn install_bearer_auth(doc: &mut JsonObject) {
    let components = doc
        .entry("components")
        .or_insert_with(|| Value::Object(JsonObject::new()));
    if !components.is_object() {
        *components = Value::Object(JsonObject::new());
    }

    components["securitySchemes"] = json!({
        BEARER_SCHEME: {"type": "http", "scheme": "bearer"}
    });
    doc.insert("security".to_string(), json!([{ BEARER_SCHEME: [] }]));
}

/// Give the token-bias schema a numeric `additionalProperties` map.
///
/// Only applies when the schema is an object type without properties.
pub fn backfill_token_bias_model(doc: &mut JsonObject, schema_name: &str) -> bool {
    let Some(schema) = doc
        .get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
        .and_then(|s| s.get_mut(schema_name))
    else {
        return false;
    };

    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let has_properties = schema.get("properties").is_some_and(is_truthy);
    if !is_object || has_properties {
        return false;
    }

    let backfilled = json!({
        "type": "object",
        "description": "Modify the likelihood of tokens appearing in the completion",
        "additionalProperties": {
            "type": "number",
            "minimum": -100,
            "maximum": 100
        }
    });
    if *schema == backfilled {
        return false;
    }

    *schema = backfilled;
    true
}

/// Set `"type": "object"` on component schemas that declare `properties`
/// without a `type`. Returns how many schemas changed.
pub fn type_untyped_schemas(doc: &mut JsonObject) -> usize {
    let Some(Value::Object(schemas)) = doc
        .get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
    else {
        return 0;
    };

    let mut fixed = 0;
    for schema in schemas.values_mut() {
        let Some(schema) = schema.as_object_mut() else {
            continue;
        };
        if schema.contains_key("properties") && !schema.contains_key("type") {
            schema.insert("type".to_string(), json!("object"));
            fixed += 1;
        }
    }

    fixed
}

/// Merge the per-role `anyOf` message variants of the chat request into one
/// object schema.
///
/// Properties keep the definition from the first variant declaring them;
/// `role` enums and `required` lists are unioned and sorted.
pub fn flatten_chat_messages(doc: &mut JsonObject, chat_path: &str) -> bool {
    let Some(Value::Object(items)) = doc
        .get_mut("paths")
        .and_then(|p| p.get_mut(chat_path))
        .and_then(|p| p.get_mut("post"))
        .and_then(|p| p.get_mut("requestBody"))
        .and_then(|p| p.get_mut("content"))
        .and_then(|p| p.get_mut("application/json"))
        .and_then(|p| p.get_mut("schema"))
        .and_then(|p| p.get_mut("properties"))
        .and_then(|p| p.get_mut("messages"))
        .and_then(|p| p.get_mut("items"))
    else {
        return false;
    };

    let Some(variants) = items.get("anyOf") else {
        return false;
    };

    let mut properties = JsonObject::new();
    let mut roles: Vec<Value> = Vec::new();
    let mut required: Vec<Value> = Vec::new();

    for variant in variants.as_array().into_iter().flatten() {
        let Some(Value::Object(variant_props)) = variant.get("properties") else {
            continue;
        };

        for (name, definition) in variant_props {
            match definition.get("enum") {
                Some(role_enum) if name == "role" => {
                    extend_unique(&mut roles, role_enum.as_array().into_iter().flatten());
                }
                _ => {
                    if !properties.contains_key(name) {
                        properties.insert(name.clone(), definition.clone());
                    }
                }
            }
        }

        if let Some(Value::Array(names)) = variant.get("required") {
            extend_unique(&mut required, names.iter());
        }
    }

    if !roles.is_empty() {
        sort_values(&mut roles);
        properties.insert(
            "role".to_string(),
            json!({
                "type": "string",
                "enum": roles,
                "description": "Role of the message sender."
            }),
        );
    }

    items.clear();
    items.insert("type".to_string(), json!("object"));
    items.insert("description".to_string(), json!("Chat completion message."));
    items.insert("properties".to_string(), Value::Object(properties));

    if !required.is_empty() {
        sort_values(&mut required);
        items.insert("required".to_string(), Value::Array(required));
    }

    true
}

fn extend_unique<'a>(into: &mut Vec<Value>, values: impl Iterator<Item = &'a Value>) {
    for value in values {
        if !into.contains(value) {
            into.push(value.clone());
        }
    }
}

fn sort_values(values: &mut [Value]) {
    values.sort_by_key(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
}
