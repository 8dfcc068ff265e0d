use std::collections::BTreeMap;

use thiserror::Error;

use crate::admission::Operation;
use crate::patch::create_patch;
use crate::product::{Product, ANNOTATION_WEBHOOK_STATUS, MUTATED};

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("user not found in request")]
    MissingUser,

    #[error("cannot serialize patch: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Compute the JSON Patch marking `product` as mutated.
///
/// `Ok(None)` means nothing has to change: DELETE requests and objects that
/// already carry the mutated marker are left alone. Every other request
/// must be attributable to a user.
pub fn mutate_product(
    product: &Product,
    operation: &Operation,
    user: &str,
) -> Result<Option<Vec<u8>>, MutationError> {
    if *operation == Operation::Delete {
        return Ok(None);
    }

    if product.is_mutated() {
        return Ok(None);
    }

    if user.is_empty() {
        return Err(MutationError::MissingUser);
    }

    let add_annotations =
        BTreeMap::from([(ANNOTATION_WEBHOOK_STATUS.to_owned(), MUTATED.to_owned())]);
    let add_labels = BTreeMap::new();

    let patch = create_patch(
        product.annotations(),
        product.labels(),
        &add_annotations,
        &add_labels,
    );

    Ok(Some(serde_json::to_vec(&patch)?))
}
