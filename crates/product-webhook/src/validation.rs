use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::admission::Operation;
use crate::product::Product;

const RESERVED_NAME_PREFIX: &str = "kube-";

lazy_static! {
    static ref BRAND_PATTERN: Regex = Regex::new(r"^[a-zA-Z-]+$").unwrap();
}

/// All the rules a product violates, in evaluation order.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{}", .violations.join(". "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Validate `product` for the given operation. Only CREATE and UPDATE are
/// checked; any other operation passes untouched.
pub fn validate_product(product: &Product, operation: &Operation) -> Result<(), ValidationError> {
    if !matches!(operation, Operation::Create | Operation::Update) {
        return Ok(());
    }

    let violations: Vec<String> = [validate_name(product.name()), validate_brand(&product.spec.brand)]
        .into_iter()
        .flatten()
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn validate_name(name: &str) -> Option<String> {
    name.starts_with(RESERVED_NAME_PREFIX).then(|| {
        format!("metadata.name {name} with prefix {RESERVED_NAME_PREFIX} is not allowed")
    })
}

fn validate_brand(brand: &str) -> Option<String> {
    (!BRAND_PATTERN.is_match(brand)).then(|| format!("spec.brand {brand} is not valid"))
}
