use axum::{
    body::Bytes,
    extract::{self, OriginalUri},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info, Span};

use crate::{
    admission::{AdmissionRequest, AdmissionResponse},
    api::{
        api_error::ApiError,
        service::{decode_admission_review, encode_admission_review, ReviewError, Route},
        state::ApiServerState,
    },
};

// Serves `/mutate`, `/validate` and, as router fallback, every other path:
// those requests are still decoded and answered with a denial.
#[tracing::instrument(
    name = "admission_review",
    fields(
        path = uri.path(),
        host = crate::config::HOSTNAME.as_str(),
        request_uid = tracing::field::Empty,
        name = tracing::field::Empty,
        namespace = tracing::field::Empty,
        operation = tracing::field::Empty,
        user = tracing::field::Empty,
        allowed = tracing::field::Empty,
        mutated = tracing::field::Empty,
        response_message = tracing::field::Empty,
    ),
    skip_all)]
pub(crate) async fn review_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let admission_review = decode_admission_review(&body).map_err(handle_review_error)?;
    debug!(admission_review = ?admission_review, "admission review received");

    if let Some(request) = &admission_review.request {
        populate_span_with_admission_request_data(request);
    }

    let route = Route::from(uri.path());
    let response = state.dispatcher.review(&route, &admission_review);

    populate_span_with_admission_response(&response);
    if response.allowed {
        info!("admission review completed successfully");
    } else {
        info!("admission review failed");
    }

    let body =
        encode_admission_review(&admission_review, response).map_err(handle_review_error)?;

    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
        body,
    )
        .into_response())
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

fn populate_span_with_admission_request_data(adm_req: &AdmissionRequest) {
    Span::current().record("request_uid", adm_req.uid.as_str());
    Span::current().record("name", adm_req.name());
    Span::current().record("namespace", adm_req.namespace());
    Span::current().record("operation", adm_req.operation.as_str());
    Span::current().record("user", adm_req.username());
}

fn populate_span_with_admission_response(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.patch.is_some());
    if let Some(message) = response.message() {
        Span::current().record("response_message", message);
    }
}

fn handle_review_error(error: ReviewError) -> ApiError {
    let api_error = ApiError::from(error);
    error!(
        error = %api_error.message,
        status = api_error.status.as_u16(),
        "cannot process admission review"
    );
    api_error
}
