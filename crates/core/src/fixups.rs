//! Structural fixups applied by the generic walker.
//!
//! Each function here matches [`crate::walker::Fixup`] and is idempotent: a
//! second pass over its own output reports `0` changes.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::walker::{Fixup, JsonObject};

/// Canonical spelling of the product name.
pub const CANONICAL_NAME: &str = "kluster.ai";

/// The fixups run by the normalizer's walker pass, in order.
pub const WALKER_FIXUPS: [Fixup; 3] = [fix_array_examples, fix_anyof_enums, fix_naming];

/// Wrap a scalar `example` on an array-typed schema into a one-element array.
pub fn fix_array_examples(obj: &mut JsonObject, _path: &str) -> usize {
    if obj.get("type").and_then(Value::as_str) != Some("array") {
        return 0;
    }

    match obj.get_mut("example") {
        Some(example) if !example.is_array() && !example.is_null() => {
            let original = example.take();
            *example = Value::Array(vec![original]);
            1
        }
        _ => 0,
    }
}

/// Collapse an `anyOf` of single-value enums into one `type` + `enum` node.
///
/// All-or-nothing: every branch must be an object with `type` and an `enum`
/// array of exactly one element. The unified type is the first non-null
/// branch type.
pub fn fix_anyof_enums(obj: &mut JsonObject, _path: &str) -> usize {
    let Some(Value::Array(branches)) = obj.get("anyOf") else {
        return 0;
    };

    let mut enum_values = Vec::with_capacity(branches.len());
    let mut enum_type: Option<&Value> = None;

    for branch in branches {
        let Some(branch) = branch.as_object() else {
            return 0;
        };
        let (Some(Value::Array(values)), Some(branch_type)) = (branch.get("enum"), branch.get("type"))
        else {
            return 0;
        };
        if values.len() != 1 {
            return 0;
        }

        enum_values.push(values[0].clone());
        if !branch_type.is_null() {
            enum_type.get_or_insert(branch_type);
        }
    }

    let Some(enum_type) = enum_type.filter(|t| is_truthy(t)).cloned() else {
        return 0;
    };

    obj.shift_remove("anyOf");
    obj.insert("type".to_string(), enum_type);
    obj.insert("enum".to_string(), Value::Array(enum_values));
    1
}

/// Rewrite known spellings of the product name to [`CANONICAL_NAME`].
///
/// Every string-valued key of the node is checked; returns how many values
/// changed.
pub fn fix_naming(obj: &mut JsonObject, _path: &str) -> usize {
    let mut count = 0;

    for value in obj.values_mut() {
        let Value::String(text) = value else {
            continue;
        };

        if let Some(renamed) = canonicalize_name(text) {
            *text = renamed;
            count += 1;
        }
    }

    count
}

/// Returns the rewritten text, or `None` when no variant occurs in it.
pub fn canonicalize_name(text: &str) -> Option<String> {
    static RE_NAME: OnceLock<Regex> = OnceLock::new();
    let re_name = RE_NAME.get_or_init(|| {
        Regex::new(r"\b(?:KlusterAI|Kluster AI|KLUSTER AI|Kluster\.ai|KLUSTERAI)\b").unwrap()
    });

    if !re_name.is_match(text) {
        return None;
    }
    Some(re_name.replace_all(text, CANONICAL_NAME).into_owned())
}

/// False for null, `false`, zero, and empty strings, arrays and objects.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::apply_fixes;
    use serde_json::json;

    fn run(fixup: Fixup, mut node: Value) -> (usize, Value) {
        let obj = node.as_object_mut().unwrap();
        let count = fixup(obj, "");
        (count, node)
    }

    // ============================================================================
    // fix_array_examples tests
    // ============================================================================

    #[test]
    fn test_fix_array_examples_wraps_scalar() {
        let (count, node) = run(fix_array_examples, json!({"type": "array", "example": "x"}));
        assert_eq!(count, 1);
        assert_eq!(node, json!({"type": "array", "example": ["x"]}));
    }

    #[test]
    fn test_fix_array_examples_wraps_object_example() {
        let (count, node) = run(
            fix_array_examples,
            json!({"type": "array", "example": {"id": 1}}),
        );
        assert_eq!(count, 1);
        assert_eq!(node["example"], json!([{"id": 1}]));
    }

    #[test]
    fn test_fix_array_examples_leaves_array_example() {
        let (count, node) = run(fix_array_examples, json!({"type": "array", "example": ["x"]}));
        assert_eq!(count, 0);
        assert_eq!(node, json!({"type": "array", "example": ["x"]}));
    }

    #[test]
    fn test_fix_array_examples_leaves_null_example() {
        let (count, node) = run(fix_array_examples, json!({"type": "array", "example": null}));
        assert_eq!(count, 0);
        assert_eq!(node["example"], Value::Null);
    }

    #[test]
    fn test_fix_array_examples_ignores_other_types() {
        let (count, node) = run(fix_array_examples, json!({"type": "string", "example": "x"}));
        assert_eq!(count, 0);
        assert_eq!(node["example"], json!("x"));
    }

    #[test]
    fn test_fix_array_examples_is_idempotent() {
        let (first, node) = run(fix_array_examples, json!({"type": "array", "example": 3}));
        let (second, node) = run(fix_array_examples, node);
        assert_eq!((first, second), (1, 0));
        assert_eq!(node["example"], json!([3]));
    }

    // ============================================================================
    // fix_anyof_enums tests
    // ============================================================================

    #[test]
    fn test_fix_anyof_enums_flattens_single_value_branches() {
        let (count, node) = run(
            fix_anyof_enums,
            json!({"anyOf": [{"type": "string", "enum": ["a"]}, {"type": "string", "enum": ["b"]}]}),
        );
        assert_eq!(count, 1);
        assert_eq!(node, json!({"type": "string", "enum": ["a", "b"]}));
    }

    #[test]
    fn test_fix_anyof_enums_rejects_multi_value_branch() {
        let input = json!({"anyOf": [{"type": "string", "enum": ["a", "b"]}, {"type": "string", "enum": ["c"]}]});
        let (count, node) = run(fix_anyof_enums, input.clone());
        assert_eq!(count, 0);
        assert_eq!(node, input);
    }

    #[test]
    fn test_fix_anyof_enums_rejects_branch_without_type() {
        let input = json!({"anyOf": [{"type": "string", "enum": ["a"]}, {"enum": ["b"]}]});
        let (count, node) = run(fix_anyof_enums, input.clone());
        assert_eq!(count, 0);
        assert_eq!(node, input);
    }

    #[test]
    fn test_fix_anyof_enums_rejects_ref_branch() {
        let input = json!({"anyOf": [{"type": "string", "enum": ["a"]}, {"$ref": "#/components/schemas/X"}]});
        let (count, _) = run(fix_anyof_enums, input);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_fix_anyof_enums_first_branch_type_wins() {
        let (count, node) = run(
            fix_anyof_enums,
            json!({"anyOf": [{"type": "integer", "enum": [1]}, {"type": "string", "enum": ["two"]}]}),
        );
        assert_eq!(count, 1);
        assert_eq!(node, json!({"type": "integer", "enum": [1, "two"]}));
    }

    #[test]
    fn test_fix_anyof_enums_skips_null_type_when_choosing() {
        let (count, node) = run(
            fix_anyof_enums,
            json!({"anyOf": [{"type": null, "enum": ["a"]}, {"type": "string", "enum": ["b"]}]}),
        );
        assert_eq!(count, 1);
        assert_eq!(node, json!({"type": "string", "enum": ["a", "b"]}));
    }

    #[test]
    fn test_fix_anyof_enums_all_null_types_is_noop() {
        let input = json!({"anyOf": [{"type": null, "enum": ["a"]}]});
        let (count, node) = run(fix_anyof_enums, input.clone());
        assert_eq!(count, 0);
        assert_eq!(node, input);
    }

    #[test]
    fn test_fix_anyof_enums_empty_branch_list_is_noop() {
        let (count, node) = run(fix_anyof_enums, json!({"anyOf": []}));
        assert_eq!(count, 0);
        assert_eq!(node, json!({"anyOf": []}));
    }

    #[test]
    fn test_fix_anyof_enums_blank_type_is_noop() {
        let input = json!({"anyOf": [{"type": "", "enum": ["a"]}]});
        let (count, node) = run(fix_anyof_enums, input.clone());
        assert_eq!(count, 0);
        assert_eq!(node, input);
    }

    #[test]
    fn test_fix_anyof_enums_keeps_sibling_keys_in_order() {
        let (_, node) = run(
            fix_anyof_enums,
            json!({"title": "Mode", "anyOf": [{"type": "string", "enum": ["fast"]}], "default": "fast"}),
        );
        let keys: Vec<&String> = node.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["title", "default", "type", "enum"]);
    }

    #[test]
    fn test_fix_anyof_enums_ignores_non_array_anyof() {
        let (count, _) = run(fix_anyof_enums, json!({"anyOf": {"type": "string"}}));
        assert_eq!(count, 0);
    }

    // ============================================================================
    // fix_naming tests
    // ============================================================================

    #[test]
    fn test_fix_naming_rewrites_all_variants_in_one_pass() {
        let (count, node) = run(
            fix_naming,
            json!({"description": "KlusterAI and Kluster AI, also KLUSTER AI or Kluster.ai and KLUSTERAI"}),
        );
        assert_eq!(count, 1);
        assert_eq!(
            node["description"],
            json!("kluster.ai and kluster.ai, also kluster.ai or kluster.ai and kluster.ai")
        );
    }

    #[test]
    fn test_fix_naming_counts_each_changed_value() {
        let (count, node) = run(
            fix_naming,
            json!({"title": "Kluster AI API", "summary": "Uses KlusterAI", "plain": "nothing", "n": 3}),
        );
        assert_eq!(count, 2);
        assert_eq!(node["title"], json!("kluster.ai API"));
        assert_eq!(node["summary"], json!("Uses kluster.ai"));
        assert_eq!(node["plain"], json!("nothing"));
    }

    #[test]
    fn test_fix_naming_respects_word_boundaries() {
        let (count, node) = run(fix_naming, json!({"id": "MyKlusterAIClient", "other": "KLUSTERAIX"}));
        assert_eq!(count, 0);
        assert_eq!(node["id"], json!("MyKlusterAIClient"));
    }

    #[test]
    fn test_fix_naming_is_case_sensitive() {
        let (count, _) = run(fix_naming, json!({"text": "kluster ai and Kluster Ai"}));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_fix_naming_is_idempotent() {
        let (first, node) = run(fix_naming, json!({"text": "Welcome to Kluster AI"}));
        let (second, _) = run(fix_naming, node);
        assert_eq!((first, second), (1, 0));
    }

    #[test]
    fn test_canonicalize_name_returns_none_without_match() {
        assert_eq!(canonicalize_name("kluster.ai"), None);
        assert_eq!(
            canonicalize_name("Kluster.ai docs"),
            Some("kluster.ai docs".to_string())
        );
    }

    // ============================================================================
    // walker integration
    // ============================================================================

    #[test]
    fn test_walker_fixups_across_tree() {
        let mut doc = json!({
            "components": {"schemas": {
                "Ids": {"type": "array", "example": "abc"},
                "Mode": {"anyOf": [{"type": "string", "enum": ["a"]}, {"type": "string", "enum": ["b"]}]},
                "Note": {"type": "string", "description": "Served by Kluster AI"}
            }}
        });
        let mut fixes = WALKER_FIXUPS;

        assert_eq!(apply_fixes(&mut doc, &mut fixes), 3);
        assert_eq!(apply_fixes(&mut doc, &mut fixes), 0);
        assert_eq!(doc["components"]["schemas"]["Ids"]["example"], json!(["abc"]));
        assert_eq!(doc["components"]["schemas"]["Mode"], json!({"type": "string", "enum": ["a", "b"]}));
        assert_eq!(
            doc["components"]["schemas"]["Note"]["description"],
            json!("Served by kluster.ai")
        );
    }
}
