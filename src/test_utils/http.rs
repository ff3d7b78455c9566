use axum::{body::Body, http::StatusCode, response::Response};
use serde_json::Value;

use super::html::read_body_text;

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}

pub(crate) async fn parse_json(response: Response<Body>) -> Value {
    let text = read_body_text(response).await;

    serde_json::from_str(&text).unwrap_or_else(|error| panic!("Invalid JSON {text:?}: {error}"))
}

/// Check the status code and the `error` field of a JSON API error.
pub(crate) async fn assert_json_error(response: Response<Body>, status: StatusCode, kind: &str) {
    assert_eq!(response.status(), status);

    let json = parse_json(response).await;
    assert_eq!(json["error"], kind, "got error body {json}");
}
