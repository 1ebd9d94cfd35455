//! Tag relabelling and pruning of undocumented operations.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::fixups::is_truthy;
use crate::walker::JsonObject;

/// A tag whose label was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRename {
    pub from: String,
    pub to: String,
}

/// An operation dropped because it carried no tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedEndpoint {
    pub method: String,
    pub path: String,
}

impl std::fmt::Display for RemovedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method.to_uppercase(), self.path)
    }
}

/// Outcome of [`normalize_tag_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagListChanges {
    pub renamed: Vec<TagRename>,
    pub removed: Vec<String>,
}

/// Turn a camel-cased tag into a spaced, sentence-cased label.
///
/// "chatCompletions" becomes "Chat completions". A result that matches one of
/// `abbreviations` case-insensitively is replaced by the abbreviation itself,
/// so "mcp" stays "MCP".
pub fn format_tag_name(tag_name: &str, abbreviations: &[String]) -> String {
    static RE_HUMP: OnceLock<Regex> = OnceLock::new();
    let re_hump = RE_HUMP.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap());

    let split = re_hump.replace_all(tag_name, "$1 $2");
    let formatted = sentence_case(&split);

    abbreviations
        .iter()
        .find(|abbrev| abbrev.to_lowercase() == formatted.to_lowercase())
        .cloned()
        .unwrap_or(formatted)
}

/// Upper-case the first character and lower-case the rest.
fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Relabel the root `tags` list and drop the internal-only tag from it.
pub fn normalize_tag_list(
    doc: &mut JsonObject,
    internal_tag: &str,
    abbreviations: &[String],
) -> TagListChanges {
    let mut changes = TagListChanges::default();

    let Some(Value::Array(tags)) = doc.get_mut("tags") else {
        return changes;
    };

    tags.retain(|tag| {
        let is_internal = tag.get("name").and_then(Value::as_str) == Some(internal_tag);
        if is_internal {
            changes.removed.push(internal_tag.to_string());
        }
        !is_internal
    });

    for tag in tags.iter_mut() {
        let Some(Value::String(name)) = tag.get_mut("name") else {
            continue;
        };
        let formatted = format_tag_name(name, abbreviations);
        if formatted == *name {
            continue;
        }
        changes.renamed.push(TagRename {
            from: std::mem::replace(name, formatted.clone()),
            to: formatted,
        });
    }

    changes
}

/// Relabel every operation's tag references and drop the internal-only tag.
///
/// Returns how many references were dropped or changed.
pub fn normalize_endpoint_tags(
    doc: &mut JsonObject,
    internal_tag: &str,
    abbreviations: &[String],
) -> usize {
    let mut changed = 0;

    let Some(Value::Object(paths)) = doc.get_mut("paths") else {
        return changed;
    };

    for path_item in paths.values_mut() {
        let Some(path_item) = path_item.as_object_mut() else {
            continue;
        };

        for operation in path_item.values_mut() {
            let Some(Value::Array(tags)) = operation.get_mut("tags") else {
                continue;
            };

            let mut updated = Vec::with_capacity(tags.len());
            for tag in tags.drain(..) {
                match tag {
                    Value::String(name) if name == internal_tag => changed += 1,
                    Value::String(name) => {
                        let formatted = format_tag_name(&name, abbreviations);
                        if formatted != name {
                            changed += 1;
                        }
                        updated.push(Value::String(formatted));
                    }
                    other => updated.push(other),
                }
            }
            *tags = updated;
        }
    }

    changed
}

/// Whether a path-item member is an operation with at least one tag.
fn is_documented(operation: &Value) -> bool {
    operation.get("tags").is_some_and(is_truthy)
}

/// Remove operations without tags, and paths left with no documented operation.
///
/// Only object members of a path item count as operations; `summary`,
/// `parameters` and other non-object members are left alone. Removed
/// endpoints are returned in document order.
pub fn prune_undocumented_endpoints(doc: &mut JsonObject) -> Vec<RemovedEndpoint> {
    let mut removed = Vec::new();

    let Some(Value::Object(paths)) = doc.get_mut("paths") else {
        return removed;
    };

    let mut empty_paths = Vec::new();

    for (path, path_item) in paths.iter_mut() {
        let Some(path_item) = path_item.as_object_mut() else {
            continue;
        };

        let undocumented: Vec<String> = path_item
            .iter()
            .filter(|(_, op)| op.is_object() && !is_documented(op))
            .map(|(method, _)| method.clone())
            .collect();
        if undocumented.is_empty() {
            continue;
        }

        let has_documented = path_item
            .values()
            .any(|op| op.is_object() && is_documented(op));

        for method in undocumented {
            removed.push(RemovedEndpoint {
                method: method.clone(),
                path: path.clone(),
            });
            if has_documented {
                path_item.shift_remove(&method);
            }
        }

        if !has_documented {
            empty_paths.push(path.clone());
        }
    }

    for path in empty_paths {
        paths.shift_remove(&path);
    }

    removed
}
