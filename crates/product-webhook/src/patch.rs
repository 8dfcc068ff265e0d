//! JSON Patch (RFC 6902) generation for annotation and label additions.

use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, Patch, PatchOperation};
use std::collections::BTreeMap;

const ANNOTATIONS: &str = "annotations";
const LABELS: &str = "labels";

/// Build the `add` operations turning `current_*` into a superset of
/// `add_*`. Keys already holding the wanted value produce nothing, so
/// running this against an already patched object yields an empty patch.
///
/// Annotation operations come first, in the iteration order of
/// `add_annotations`, followed by the label operations.
pub fn create_patch(
    current_annotations: &BTreeMap<String, String>,
    current_labels: &BTreeMap<String, String>,
    add_annotations: &BTreeMap<String, String>,
    add_labels: &BTreeMap<String, String>,
) -> Patch {
    let mut operations = diff(ANNOTATIONS, current_annotations, add_annotations);
    operations.extend(diff(LABELS, current_labels, add_labels));
    Patch(operations)
}

fn diff(
    field: &str,
    current: &BTreeMap<String, String>,
    wanted: &BTreeMap<String, String>,
) -> Vec<PatchOperation> {
    wanted
        .iter()
        .filter(|(key, value)| current.get(*key) != Some(*value))
        .map(|(key, value)| {
            PatchOperation::Add(AddOperation {
                path: PointerBuf::from_tokens(["metadata", field, key.as_str()]),
                value: serde_json::Value::String(value.to_owned()),
            })
        })
        .collect()
}
