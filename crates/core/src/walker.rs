use serde_json::{Map, Value};

/// A JSON object node, the unit every fixup operates on.
pub type JsonObject = Map<String, Value>;

/// Signature shared by the structural fixups in [`crate::fixups`].
///
/// A fixup receives one object node plus its diagnostic path and returns how
/// many changes it made there. It may rewrite the node's own keys but never
/// touches siblings or ancestors, and it must be a no-op returning `0` when
/// the node does not match its trigger.
pub type Fixup = fn(&mut JsonObject, &str) -> usize;

/// Apply every fixup to every object node in the tree, root included.
///
/// Traversal is depth-first pre-order: all fixups run against a node, in the
/// order given, before the walker descends into that node's children. A
/// fixup that removes a subtree therefore prevents the walker from visiting
/// it. Returns the sum of all fixup results across the tree.
pub fn apply_fixes<F>(node: &mut Value, fixes: &mut [F]) -> usize
where
    F: FnMut(&mut JsonObject, &str) -> usize,
{
    apply_fixes_at(node, fixes, "")
}

/// Same as [`apply_fixes`] but starting from an explicit path prefix.
///
/// Object children extend the path as `{path}.{key}`, array elements as
/// `{path}[{index}]`; the root path is the empty string.
pub fn apply_fixes_at<F>(node: &mut Value, fixes: &mut [F], path: &str) -> usize
where
    F: FnMut(&mut JsonObject, &str) -> usize,
{
    let mut fixed_count = 0;

    match node {
        Value::Object(obj) => {
            for fix in fixes.iter_mut() {
                fixed_count += fix(obj, path);
            }

            // Children are read only after every fixup at this node has run.
            for (key, value) in obj.iter_mut() {
                if value.is_object() || value.is_array() {
                    fixed_count += apply_fixes_at(value, fixes, &format!("{path}.{key}"));
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                if item.is_object() || item.is_array() {
                    fixed_count += apply_fixes_at(item, fixes, &format!("{path}[{i}]"));
                }
            }
        }
        _ => {}
    }

    fixed_count
}

/// Read-only counterpart of [`apply_fixes`].
///
/// Calls `visit` on every object node in the same pre-order and with the same
/// paths, without requiring mutable access to the document.
pub fn visit_objects<F>(node: &Value, visit: &mut F)
where
    F: FnMut(&JsonObject, &str),
{
    visit_objects_at(node, visit, "");
}

fn visit_objects_at<F>(node: &Value, visit: &mut F, path: &str)
where
    F: FnMut(&JsonObject, &str),
{
    match node {
        Value::Object(obj) => {
            visit(obj, path);
            for (key, value) in obj {
                visit_objects_at(value, visit, &format!("{path}.{key}"));
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                visit_objects_at(item, visit, &format!("{path}[{i}]"));
            }
        }
        _ => {}
    }
}

/// Paths of every object node reachable from `node`, in pre-order.
pub fn object_paths(node: &Value) -> Vec<String> {
    let mut out = Vec::new();
    visit_objects(node, &mut |_, path| out.push(path.to_string()));
    out
}
