use crate::admission::{AdmissionRequest, AdmissionResponse};

const DEFAULT_API_VERSION: &str = "admission.k8s.io/v1";
const DEFAULT_KIND: &str = "AdmissionReview";

/// Inbound `AdmissionReview`. `request` is optional on purpose: an envelope
/// without it still decodes and gets a structured denial.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub request: Option<AdmissionRequest>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    /// Build the reply to `review`: the `apiVersion`/`kind` pair is echoed so
    /// that v1beta1 callers get a v1beta1 answer, and the response `uid` is
    /// forced to the request one.
    pub fn for_review(review: &AdmissionReviewRequest, response: AdmissionResponse) -> Self {
        let uid = review
            .request
            .as_ref()
            .map(|request| request.uid.clone())
            .unwrap_or_default();

        AdmissionReviewResponse {
            api_version: Some(
                review
                    .api_version
                    .clone()
                    .unwrap_or_else(|| String::from(DEFAULT_API_VERSION)),
            ),
            kind: Some(
                review
                    .kind
                    .clone()
                    .unwrap_or_else(|| String::from(DEFAULT_KIND)),
            ),
            response: AdmissionResponse { uid, ..response },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn echoes_version_and_uid() {
        let review: AdmissionReviewRequest = serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1beta1",
            "kind": "AdmissionReview",
            "request": {"uid": "705ab4f5", "operation": "CREATE"}
        }))
        .unwrap();

        let reply = AdmissionReviewResponse::for_review(
            &review,
            AdmissionResponse::allow("something-else".to_owned()),
        );

        assert_eq!(reply.api_version.as_deref(), Some("admission.k8s.io/v1beta1"));
        assert_eq!(reply.response.uid, "705ab4f5");
    }

    #[test]
    fn defaults_when_envelope_is_bare() {
        let reply = AdmissionReviewResponse::for_review(
            &AdmissionReviewRequest::default(),
            AdmissionResponse::reject(String::new(), "request is empty".to_owned()),
        );

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "apiVersion": "admission.k8s.io/v1",
                "kind": "AdmissionReview",
                "response": {
                    "uid": "",
                    "allowed": false,
                    "status": {"message": "request is empty"}
                }
            })
        );
    }
}
