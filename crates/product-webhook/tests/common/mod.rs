use axum::{
    body::Body,
    http::{self, header, Request},
    Router,
};
use http_body_util::BodyExt;
use product_webhook::{bypass::BypassRules, config::Config, ProductWebhook};
use serde_json::{json, Value};
use std::{collections::HashSet, net::SocketAddr};
use tower::ServiceExt;

pub(crate) const BLACKLISTED_USER: &str = "mallory";
pub(crate) const BLACKLISTED_NAMESPACE: &str = "quarantine";
pub(crate) const SYSTEM_USER: &str = "system:serviceaccount:kube-system:product-controller";

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        tls_config: None,
        bypass_rules: BypassRules {
            blacklist_users: set(&[BLACKLISTED_USER]),
            blacklist_namespaces: set(&[BLACKLISTED_NAMESPACE]),
            system_users: set(&[SYSTEM_USER]),
            system_namespaces: HashSet::new(),
        },
        allowlist_namespaces: set(&["kube-system", "kube-public"]),
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) async fn app(config: Config) -> Router {
    let server = ProductWebhook::new_from_config(config).await.unwrap();

    server.router()
}

pub(crate) fn product(namespace: &str, name: &str, brand: &str) -> Value {
    json!({
        "apiVersion": "estore.io/v1",
        "kind": "Product",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "annotations": {},
            "labels": {}
        },
        "spec": {"brand": brand}
    })
}

pub(crate) fn admission_review(operation: &str, username: &str, object: &Value) -> Value {
    let mut request = json!({
        "uid": "0df28fbd-5f5f-4c8f-9b7e-1c8d2f2b8a11",
        "kind": {"group": "estore.io", "version": "v1", "kind": "Product"},
        "resource": {"group": "estore.io", "version": "v1", "resource": "products"},
        "name": object["metadata"]["name"],
        "namespace": object["metadata"]["namespace"],
        "operation": operation,
        "userInfo": {"username": username, "groups": ["system:authenticated"]},
        "dryRun": false
    });
    if operation.eq_ignore_ascii_case("DELETE") {
        request["oldObject"] = object.clone();
    } else {
        request["object"] = object.clone();
    }

    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": request
    })
}

/// POST `body` to `uri`, returning the status code and the decoded JSON body.
pub(crate) async fn post(app: Router, uri: &str, body: Body) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method(http::Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .uri(uri)
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}
