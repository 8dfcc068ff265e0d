use base64::{engine::general_purpose, Engine as _};
use k8s_openapi::api::authentication::v1::UserInfo;
use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde::{Deserialize, Serialize};
use std::fmt;

/// This models the admission/v1/AdmissionRequest object of Kubernetes,
/// limited to the fields the webhook consumes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub object: Option<RawExtension>,
    #[serde(default)]
    pub old_object: Option<RawExtension>,
}

impl AdmissionRequest {
    pub fn username(&self) -> &str {
        self.user_info.username.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The object the policies look at. The API server does not populate
    /// `object` on DELETE, the persisted state lives in `oldObject`.
    pub fn target_object(&self) -> Option<&serde_json::Value> {
        let raw = if self.operation == Operation::Delete {
            self.old_object.as_ref()
        } else {
            self.object.as_ref()
        };
        raw.map(|raw| &raw.0)
    }
}

/// Operation of an admission request. Parsing ignores case; anything that is
/// not CREATE, UPDATE or DELETE (e.g. CONNECT) is kept verbatim. A request
/// without an operation carries an empty `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Other(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Other(op) => op.as_str(),
        }
    }
}

impl Default for Operation {
    fn default() -> Self {
        Operation::Other(String::new())
    }
}

impl From<String> for Operation {
    fn from(op: String) -> Self {
        match op.to_ascii_uppercase().as_str() {
            "CREATE" => Operation::Create,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            _ => Operation::Other(op),
        }
    }
}

impl From<&str> for Operation {
    fn from(op: &str) -> Self {
        Operation::from(op.to_owned())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// This models the admission/v1/AdmissionResponse object of Kubernetes
/// See https://pkg.go.dev/k8s.io/kubernetes/pkg/apis/admission#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// The type of Patch. Currently we only allow "JSONPatch".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// The patch body, base64 encoded. Only "JSONPatch" (RFC 6902) is emitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Status contains extra details into why an admission request was denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

/// PatchType is the type of patch being used to represent the mutated object
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    #[default]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// A human-readable description of the status of this operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            ..Default::default()
        }
    }

    pub fn reject(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: Some(AdmissionResponseStatus {
                message: Some(message),
            }),
            ..Default::default()
        }
    }

    /// Attach a serialized JSON Patch. An empty patch leaves the response untouched.
    pub fn with_patch(self, patch: &[u8]) -> AdmissionResponse {
        if patch.is_empty() {
            return self;
        }
        AdmissionResponse {
            patch_type: Some(PatchType::JSONPatch),
            patch: Some(general_purpose::STANDARD.encode(patch)),
            ..self
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    #[case::upper("CREATE", Operation::Create)]
    #[case::lower("update", Operation::Update)]
    #[case::mixed("Delete", Operation::Delete)]
    #[case::connect("CONNECT", Operation::Other("CONNECT".to_owned()))]
    fn operation_is_case_insensitive(#[case] input: &str, #[case] expected: Operation) {
        assert_eq!(Operation::from(input), expected);
    }

    #[test]
    fn delete_reads_old_object() {
        let request: AdmissionRequest = serde_json::from_value(json!({
            "uid": "abc",
            "operation": "delete",
            "userInfo": {"username": "admin"},
            "oldObject": {"metadata": {"name": "old"}}
        }))
        .expect("request should decode");

        assert_eq!(request.operation, Operation::Delete);
        assert_eq!(
            request.target_object(),
            Some(&json!({"metadata": {"name": "old"}}))
        );
    }

    #[test]
    fn create_reads_new_object() {
        let request: AdmissionRequest = serde_json::from_value(json!({
            "uid": "abc",
            "operation": "CREATE",
            "object": {"metadata": {"name": "new"}},
            "oldObject": {"metadata": {"name": "old"}}
        }))
        .expect("request should decode");

        assert_eq!(
            request.target_object(),
            Some(&json!({"metadata": {"name": "new"}}))
        );
        assert_eq!(request.username(), "");
    }

    #[test]
    fn unused_request_fields_are_ignored() {
        let request: AdmissionRequest = serde_json::from_value(json!({
            "uid": "abc",
            "kind": {"group": "estore.io", "version": "v1", "kind": "Product"},
            "resource": {"group": "estore.io", "version": "v1", "resource": "products"},
            "operation": "UPDATE",
            "dryRun": true,
            "options": {"apiVersion": "meta.k8s.io/v1", "kind": "UpdateOptions"},
            "object": {"metadata": {"name": "new"}}
        }))
        .expect("request should decode");

        assert_eq!(request.operation, Operation::Update);
        assert_eq!(request.uid, "abc");
    }

    #[test]
    fn missing_operation_decodes_as_empty() {
        let request: AdmissionRequest = serde_json::from_value(json!({
            "uid": "abc",
            "object": {"metadata": {"name": "new"}}
        }))
        .expect("request should decode");

        assert_eq!(request.operation, Operation::Other(String::new()));
        assert_eq!(request.operation.as_str(), "");
        assert_eq!(
            request.target_object(),
            Some(&json!({"metadata": {"name": "new"}}))
        );
    }

    #[test]
    fn allowed_response_has_no_status_on_the_wire() {
        let encoded = serde_json::to_value(AdmissionResponse::allow("abc".to_owned()))
            .expect("response should encode");

        assert_eq!(encoded, json!({"uid": "abc", "allowed": true}));
    }

    #[test]
    fn patch_is_base64_encoded() {
        let response = AdmissionResponse::allow("abc".to_owned()).with_patch(b"[]");

        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));
        assert_eq!(response.patch.as_deref(), Some("W10="));
    }

    #[test]
    fn empty_patch_is_not_attached() {
        let response = AdmissionResponse::allow("abc".to_owned()).with_patch(b"");

        assert_eq!(response, AdmissionResponse::allow("abc".to_owned()));
    }
}
