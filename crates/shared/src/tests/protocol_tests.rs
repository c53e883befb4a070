use super::*;
use serde_json::json;

#[test]
fn failure_response_has_the_uniform_shape() {
    let body = serde_json::to_value(SubmitResponse::failed()).expect("json");
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to submit survey" })
    );
}

#[test]
fn success_response_omits_error() {
    let body = serde_json::to_value(SubmitResponse::accepted()).expect("json");
    assert_eq!(body, json!({ "success": true }));
}

#[test]
fn upstream_ack_requires_boolean_true() {
    assert!(is_upstream_ack(&json!({ "success": true, "row": 12 })));
    assert!(!is_upstream_ack(&json!({ "success": false })));
    assert!(!is_upstream_ack(&json!({ "success": "true" })));
    assert!(!is_upstream_ack(&json!({ "status": "ok" })));
    assert!(!is_upstream_ack(&json!([true])));
    assert!(!is_upstream_ack(&json!(null)));
}

#[test]
fn routes_match_the_form_endpoints() {
    assert_eq!(submit_route(), "/api/submit");
    assert_eq!(health_route(), "/healthz");
}
