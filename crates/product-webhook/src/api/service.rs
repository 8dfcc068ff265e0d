use std::{collections::HashSet, fmt, sync::Arc};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    admission::{AdmissionRequest, AdmissionResponse, Operation},
    api::admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
    audit::{AuditEvent, AuditSink, Step, StepState},
    bypass::BypassRules,
    gate::admission_required,
    mutation::mutate_product,
    product::{Product, ANNOTATION_WEBHOOK_MUTATE, ANNOTATION_WEBHOOK_VALIDATE},
    validation::validate_product,
};

pub const MUTATE_PATH: &str = "/mutate";
pub const VALIDATE_PATH: &str = "/validate";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewKind {
    Mutate,
    Validate,
}

impl fmt::Display for ReviewKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReviewKind::Mutate => write!(f, "mutate"),
            ReviewKind::Validate => write!(f, "validate"),
        }
    }
}

/// The review requested by the HTTP path, resolved once at the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Review(ReviewKind),
    Unknown(String),
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        match path {
            MUTATE_PATH => Route::Review(ReviewKind::Mutate),
            VALIDATE_PATH => Route::Review(ReviewKind::Validate),
            other => Route::Unknown(other.to_owned()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("can't decode body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request is empty")]
    EmptyRequest,

    #[error("can't unmarshal product object: {0}")]
    Unmarshal(#[source] serde_json::Error),

    #[error("invalid request path {0}")]
    Routing(String),

    #[error("could not encode response: {0}")]
    Encoding(#[source] serde_json::Error),
}

/// Decode the raw HTTP body into an admission review envelope.
pub fn decode_admission_review(body: &[u8]) -> Result<AdmissionReviewRequest, ReviewError> {
    if body.is_empty() {
        return Err(ReviewError::EmptyBody);
    }
    serde_json::from_slice(body).map_err(ReviewError::Decode)
}

/// Serialize the reply to `review`.
pub fn encode_admission_review(
    review: &AdmissionReviewRequest,
    response: AdmissionResponse,
) -> Result<Vec<u8>, ReviewError> {
    serde_json::to_vec(&AdmissionReviewResponse::for_review(review, response))
        .map_err(ReviewError::Encoding)
}

/// Turns an admission review into a verdict. Holds only read-only
/// configuration, a single instance serves all the requests.
pub struct Dispatcher {
    bypass_rules: BypassRules,
    allowlist_namespaces: HashSet<String>,
    audit: Arc<dyn AuditSink>,
}

impl Dispatcher {
    pub fn new(
        bypass_rules: BypassRules,
        allowlist_namespaces: HashSet<String>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Dispatcher {
            bypass_rules,
            allowlist_namespaces,
            audit,
        }
    }

    /// Compute the verdict for `review`. Policy failures never escape as
    /// errors: they become a denial carrying the error text.
    pub fn review(&self, route: &Route, review: &AdmissionReviewRequest) -> AdmissionResponse {
        let request = match &review.request {
            Some(request) => request,
            None => {
                warn!("admission review without request");
                return AdmissionResponse::reject(String::new(), ReviewError::EmptyRequest.to_string());
            }
        };
        let uid = request.uid.clone();

        info!(
            namespace = request.namespace(),
            name = request.name(),
            user = request.username(),
            operation = %request.operation,
            "admission review"
        );

        let bypass = self
            .bypass_rules
            .classify(request.username(), request.namespace());
        if bypass.is_denied() {
            self.audit.record(AuditEvent::step(
                Step::Review,
                StepState::Error,
                format!("admission denied: {bypass}"),
            ));
            return AdmissionResponse::reject(uid, format!("admission denied: {bypass}"));
        }
        if bypass.is_trusted() {
            self.audit.record(AuditEvent::step(
                Step::Review,
                StepState::Skip,
                format!("admission skipped: {bypass}"),
            ));
            return AdmissionResponse::allow(uid);
        }

        let product = match decode_product(request.target_object()) {
            Ok(product) => product,
            Err(err) => {
                error!(error = %err, "cannot decode product");
                self.audit
                    .record(AuditEvent::step(Step::Review, StepState::Error, err.to_string()));
                return AdmissionResponse::reject(uid, err.to_string());
            }
        };
        self.record_object(request, &product);

        match route {
            Route::Review(ReviewKind::Mutate) => self.mutate(uid, request, &product),
            Route::Review(ReviewKind::Validate) => self.validate(uid, request, &product),
            Route::Unknown(path) => {
                let err = ReviewError::Routing(path.clone());
                warn!(error = %err, "unknown review path");
                AdmissionResponse::reject(uid, err.to_string())
            }
        }
    }

    fn record_object(&self, request: &AdmissionRequest, product: &Product) {
        self.audit.record(AuditEvent::ObjectReceived {
            object: product.clone(),
        });

        if request.operation != Operation::Update {
            return;
        }
        let old = request
            .old_object
            .as_ref()
            .and_then(|raw| Product::deserialize(&raw.0).ok());
        if let Some(before) = old {
            self.audit.record(AuditEvent::ObjectChanged {
                before,
                after: product.clone(),
            });
        }
    }

    fn mutate(&self, uid: String, request: &AdmissionRequest, product: &Product) -> AdmissionResponse {
        self.audit.record(AuditEvent::step(
            Step::Mutate,
            StepState::Start,
            format!("mutate namespace={}, name={}", product.namespace(), product.name()),
        ));

        let (required, reason) = admission_required(
            &self.allowlist_namespaces,
            ANNOTATION_WEBHOOK_MUTATE,
            &product.metadata,
        );
        if !required {
            self.audit
                .record(AuditEvent::step(Step::Mutate, StepState::Skip, reason));
            return AdmissionResponse::allow(uid);
        }

        match mutate_product(product, &request.operation, request.username()) {
            Err(err) => {
                self.audit
                    .record(AuditEvent::step(Step::Mutate, StepState::Error, err.to_string()));
                AdmissionResponse::reject(uid, err.to_string())
            }
            Ok(Some(patch)) => {
                debug!(patch = %String::from_utf8_lossy(&patch), "patch resource");
                self.audit.record(AuditEvent::step(
                    Step::Mutate,
                    StepState::Complete,
                    "mutation patch computed",
                ));
                AdmissionResponse::allow(uid).with_patch(&patch)
            }
            Ok(None) => {
                self.audit.record(AuditEvent::step(
                    Step::Mutate,
                    StepState::Skip,
                    "mutation not applicable",
                ));
                AdmissionResponse::allow(uid)
            }
        }
    }

    fn validate(&self, uid: String, request: &AdmissionRequest, product: &Product) -> AdmissionResponse {
        self.audit.record(AuditEvent::step(
            Step::Validate,
            StepState::Start,
            format!("validate namespace={}, name={}", product.namespace(), product.name()),
        ));

        let (required, reason) = admission_required(
            &self.allowlist_namespaces,
            ANNOTATION_WEBHOOK_VALIDATE,
            &product.metadata,
        );
        if !required {
            self.audit
                .record(AuditEvent::step(Step::Validate, StepState::Skip, reason));
            return AdmissionResponse::allow(uid);
        }

        match validate_product(product, &request.operation) {
            Err(err) => {
                self.audit.record(AuditEvent::step(
                    Step::Validate,
                    StepState::Error,
                    err.to_string(),
                ));
                AdmissionResponse::reject(uid, err.to_string())
            }
            Ok(()) => {
                self.audit.record(AuditEvent::step(
                    Step::Validate,
                    StepState::Received,
                    "product is valid",
                ));
                AdmissionResponse::allow(uid)
            }
        }
    }
}

fn decode_product(object: Option<&serde_json::Value>) -> Result<Product, ReviewError> {
    Product::deserialize(object.unwrap_or(&serde_json::Value::Null)).map_err(ReviewError::Unmarshal)
}
