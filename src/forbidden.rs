//! The page to display when a signed in user's role does not grant access to a page.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_forbidden_page() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(
            error_view(
                "Forbidden",
                "403",
                "You don't have access to that page.",
                "Ask an administrator to change your role if you need access.",
            )
            .into_string(),
        ),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_forbidden_page;

    #[tokio::test]
    async fn renders_forbidden_page() {
        let response = get_forbidden_page().await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }
}
