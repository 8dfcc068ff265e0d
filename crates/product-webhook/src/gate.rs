//! Decides whether an object is subject to admission at all.

use std::collections::HashSet;

use crate::product::ProductMeta;

/// Annotation values that switch the webhook off for a single object.
const OPT_OUT_VALUES: [&str; 4] = ["n", "no", "false", "off"];

/// Returns whether the webhook must process the object, plus a reason.
///
/// Objects living inside one of the `allowlist_namespaces` are skipped.
/// Otherwise admission is required unless the object carries
/// `annotation_key` set to one of `n`, `no`, `false`, `off` (any case).
pub fn admission_required(
    allowlist_namespaces: &HashSet<String>,
    annotation_key: &str,
    metadata: &ProductMeta,
) -> (bool, String) {
    if allowlist_namespaces.contains(&metadata.namespace) {
        return (
            false,
            format!(
                "skip admission for {} since namespace {} is allow-listed",
                metadata.name, metadata.namespace
            ),
        );
    }

    match metadata.annotations.get(annotation_key) {
        Some(value)
            if OPT_OUT_VALUES
                .iter()
                .any(|opt_out| value.eq_ignore_ascii_case(opt_out)) =>
        {
            (
                false,
                format!(
                    "skip admission for {} since annotation {}={}",
                    metadata.name, annotation_key, value
                ),
            )
        }
        _ => (true, format!("admission required for {}", metadata.name)),
    }
}
