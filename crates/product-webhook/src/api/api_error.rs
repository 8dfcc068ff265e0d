use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::api::service::ReviewError;

/// Failure to answer an admission review at the HTTP level. Policy denials
/// never end up here: they are regular `200` replies.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl From<ReviewError> for ApiError {
    fn from(error: ReviewError) -> Self {
        let status = match error {
            ReviewError::EmptyBody | ReviewError::Decode(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = json!({
            "message": self.message,
            "status": self.status.as_u16(),
        });

        (self.status, axum::Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn decode_error() -> ReviewError {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        ReviewError::Decode(err)
    }

    #[rstest]
    #[case::empty_body(ReviewError::EmptyBody, StatusCode::BAD_REQUEST)]
    #[case::decode(decode_error(), StatusCode::BAD_REQUEST)]
    #[case::empty_request(ReviewError::EmptyRequest, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::routing(
        ReviewError::Routing("/audit".to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn status_from_review_error(#[case] error: ReviewError, #[case] expected: StatusCode) {
        let message = error.to_string();
        let api_error = ApiError::from(error);

        assert_eq!(api_error.status, expected);
        assert_eq!(api_error.message, message);
    }

    #[test]
    fn response_carries_status() {
        let response = ApiError::from(ReviewError::EmptyBody).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
