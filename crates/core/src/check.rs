//! Compatibility checks against the documentation importer.
//!
//! The checks mirror what the normalizer fixes, so a normalized document
//! reports no errors. Node-level checks share the walker's traversal order
//! and path format.

use serde::Serialize;
use serde_json::Value;

use crate::fixups::is_truthy;
use crate::normalize::{NormalizerConfig, BEARER_SCHEME};
use crate::walker::{visit_objects, JsonObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Style,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Style => write!(f, "style"),
        }
    }
}

/// One compatibility issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    /// Walker path or a short area name such as `auth`.
    pub location: String,
    pub issue: String,
    /// What the importer does or says about it.
    pub message: String,
}

impl Finding {
    fn new(severity: Severity, location: impl Into<String>, issue: impl Into<String>, message: &str) -> Self {
        Self {
            severity,
            location: location.into(),
            issue: issue.into(),
            message: message.to_string(),
        }
    }
}

/// All findings for one document, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Everything that is not an error.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity != Severity::Error)
    }

    /// Inline `data` array schemas the importer will extract as models.
    pub fn data_schemas(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.issue.contains("data array"))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }
}

type NodeCheck = fn(&JsonObject, &str) -> Option<Finding>;

const NODE_CHECKS: [NodeCheck; 4] = [
    check_array_examples,
    check_empty_objects,
    check_data_arrays,
    check_anyof_enums,
];

/// Run every check over the document.
pub fn check_document(doc: &Value, config: &NormalizerConfig) -> CheckReport {
    let mut report = CheckReport::default();

    visit_objects(doc, &mut |obj, path| {
        report
            .findings
            .extend(NODE_CHECKS.iter().filter_map(|check| check(obj, path)));
    });

    check_servers(doc, &config.internal_host, &mut report.findings);
    check_auth(doc, &mut report.findings);
    check_naming(doc, &mut report.findings);
    check_chat_messages(doc, &config.chat_path, &mut report.findings);

    report
}

fn check_array_examples(obj: &JsonObject, path: &str) -> Option<Finding> {
    let example = obj.get("example")?;
    if obj.get("type").and_then(Value::as_str) != Some("array") || example.is_array() || example.is_null() {
        return None;
    }
    Some(Finding::new(
        Severity::Error,
        path,
        "Array has non-array example",
        "Missing bracket(s) for an array",
    ))
}

fn check_empty_objects(obj: &JsonObject, path: &str) -> Option<Finding> {
    let is_object = obj.get("type").and_then(Value::as_str) == Some("object");
    let has_fields = obj.get("properties").is_some_and(is_truthy)
        || obj.get("additionalProperties").is_some_and(is_truthy);
    if !is_object || has_fields || !path.contains("schemas") {
        return None;
    }
    Some(Finding::new(
        Severity::Error,
        path,
        "Empty object schema",
        "Model has no fields which is not allowed",
    ))
}

fn check_data_arrays(obj: &JsonObject, path: &str) -> Option<Finding> {
    if !path.ends_with(".data") || obj.get("type").and_then(Value::as_str) != Some("array") {
        return None;
    }
    let items = obj.get("items")?.as_object()?;
    if items.get("type").and_then(Value::as_str) != Some("object") || !items.contains_key("properties") {
        return None;
    }
    Some(Finding::new(
        Severity::Info,
        path,
        "Inline schema in data array",
        "Will become Datum schema",
    ))
}

/// An empty `anyOf` is not reported; `fix_anyof_enums` leaves it alone too.
fn check_anyof_enums(obj: &JsonObject, path: &str) -> Option<Finding> {
    let branches = obj.get("anyOf")?.as_array()?;
    let simple = !branches.is_empty()
        && branches.iter().all(|branch| {
            branch
                .get("enum")
                .and_then(Value::as_array)
                .is_some_and(|values| values.len() == 1)
        });
    if !simple {
        return None;
    }
    Some(Finding::new(
        Severity::Info,
        path,
        format!("anyOf enum with {} values", branches.len()),
        "Could be simplified",
    ))
}

fn check_servers(doc: &Value, internal_host: &str, findings: &mut Vec<Finding>) {
    let Some(servers) = doc.get("servers").and_then(Value::as_array) else {
        return;
    };

    for (i, server) in servers.iter().enumerate() {
        let url = server.get("url").and_then(Value::as_str).unwrap_or_default();
        if url.contains(internal_host) {
            findings.push(Finding::new(
                Severity::Error,
                format!("servers[{i}]"),
                format!("Wrong server URL: {url}"),
                "Should use the public API host",
            ));
        }
    }
}

fn check_auth(doc: &Value, findings: &mut Vec<Finding>) {
    let has_bearer = doc
        .get("components")
        .and_then(|c| c.get("securitySchemes"))
        .and_then(|s| s.get(BEARER_SCHEME))
        .is_some();
    if !has_bearer {
        findings.push(Finding::new(
            Severity::Warning,
            "auth",
            format!("Missing {BEARER_SCHEME}"),
            "No bearer authentication configured",
        ));
    }
}

fn check_naming(doc: &Value, findings: &mut Vec<Finding>) {
    let count = count_strings(doc, &|s| s.contains("Kluster AI"));
    if count > 0 {
        findings.push(Finding::new(
            Severity::Style,
            "naming",
            format!("{count} instances of 'Kluster AI'"),
            "Should be 'kluster.ai'",
        ));
    }
}

fn check_chat_messages(doc: &Value, chat_path: &str, findings: &mut Vec<Finding>) {
    let Some(items) = doc
        .get("paths")
        .and_then(|p| p.get(chat_path))
        .and_then(|p| p.get("post"))
        .and_then(|p| p.get("requestBody"))
        .and_then(|p| p.get("content"))
        .and_then(|p| p.get("application/json"))
        .and_then(|p| p.get("schema"))
        .and_then(|p| p.get("properties"))
        .and_then(|p| p.get("messages"))
        .and_then(|p| p.get("items"))
    else {
        return;
    };

    if items.get("anyOf").is_none() {
        return;
    }

    if items.get("example").is_some() {
        findings.push(Finding::new(
            Severity::Error,
            "chat.messages",
            "Example conflicts with anyOf",
            "Role enum error on the generated message model",
        ));
    }
    findings.push(Finding::new(
        Severity::Warning,
        "chat.messages",
        "anyOf structure",
        "Will create one message schema per variant",
    ));
}

/// Count string values anywhere in the tree matching `predicate`.
fn count_strings(value: &Value, predicate: &dyn Fn(&str) -> bool) -> usize {
    match value {
        Value::String(s) => usize::from(predicate(s)),
        Value::Array(items) => items.iter().map(|v| count_strings(v, predicate)).sum(),
        Value::Object(obj) => obj.values().map(|v| count_strings(v, predicate)).sum(),
        _ => 0,
    }
}
