use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Annotation recording whether the webhook already mutated the object.
pub const ANNOTATION_WEBHOOK_STATUS: &str = "product.estore.io/webhook-status";

/// Per-object switch for the mutating webhook.
pub const ANNOTATION_WEBHOOK_MUTATE: &str = "product.estore.io/webhook-mutate";

/// Per-object switch for the validating webhook.
pub const ANNOTATION_WEBHOOK_VALIDATE: &str = "product.estore.io/webhook-validate";

/// Value of [`ANNOTATION_WEBHOOK_STATUS`] once the mutation has been applied.
pub const MUTATED: &str = "mutated";

/// The estore `Product` custom resource, reduced to the fields the webhook
/// looks at. Unknown fields are ignored on decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub metadata: ProductMeta,

    #[serde(default)]
    pub spec: ProductSpec,
}

/// Object metadata. Annotations and labels are always present: a missing or
/// `null` map on the wire decodes to an empty one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
}

impl Product {
    #[cfg(test)]
    pub(crate) fn new(namespace: &str, name: &str, brand: &str) -> Self {
        Product {
            api_version: Some("estore.io/v1".to_owned()),
            kind: Some("Product".to_owned()),
            metadata: ProductMeta {
                name: name.to_owned(),
                namespace: namespace.to_owned(),
                ..Default::default()
            },
            spec: ProductSpec {
                brand: brand.to_owned(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.metadata.annotations
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.metadata.labels
    }

    /// True when the idempotency marker says the object was already mutated.
    pub fn is_mutated(&self) -> bool {
        self.metadata
            .annotations
            .get(ANNOTATION_WEBHOOK_STATUS)
            .is_some_and(|value| value.eq_ignore_ascii_case(MUTATED))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
