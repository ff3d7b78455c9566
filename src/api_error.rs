//! The closed set of errors returned by the JSON API.
//!
//! Every API failure is reported with one of a fixed set of status codes and
//! a matching error kind. Clients receive JSON of the form
//! `{"error": "<kind>", "details": "<optional message>"}`, while HTMX requests
//! receive the same status code with an HTML alert.

use axum::{
    Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{Error, alert::Alert, auth::GateError};

/// An error returned by an API endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request body was malformed or failed validation (400).
    InvalidBody(String),
    /// There is no valid session for the request (401).
    Unauthorized,
    /// The session's role does not grant access (403).
    Forbidden,
    /// The requested resource does not exist (404).
    NotFound,
    /// The route does not accept the request method (405).
    MethodNotAllowed,
    /// Anything else. The cause is logged and never sent to the client (500).
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    /// The HTTP status code for the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The machine readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::Internal => "internal_error",
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            ApiError::InvalidBody(details) => Some(details),
            _ => None,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidBody(_) => "Invalid request",
            ApiError::Unauthorized => "You need to log in again",
            ApiError::Forbidden => "You don't have permission to do that",
            ApiError::NotFound => "Not found",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Internal => "Something went wrong",
        }
    }

    /// Render the error as an HTML alert for HTMX requests, keeping the status code.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();
        let message = self.message().to_owned();
        let alert = match self.details() {
            Some(details) => Alert::Error {
                message,
                details: details.to_owned(),
            },
            None => Alert::ErrorSimple { message },
        };

        alert.into_response_with_status(status_code)
    }

    /// Render the error as an alert if `is_htmx` is true, otherwise as JSON.
    pub fn into_response_for(self, is_htmx: bool) -> Response {
        if is_htmx {
            self.into_alert_response()
        } else {
            self.into_response()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            details: self.details(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail(_)
            | Error::InvalidRole(_)
            | Error::EmptyName
            | Error::LastAdmin
            | Error::FutureDate(_)
            | Error::InvalidAmount
            | Error::InvalidOwner(_) => ApiError::InvalidBody(error.to_string()),
            Error::InvalidCredentials => ApiError::Unauthorized,
            Error::NotFound => ApiError::NotFound,
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                ApiError::Internal
            }
        }
    }
}

impl From<GateError> for ApiError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::Unauthenticated => ApiError::Unauthorized,
            GateError::Forbidden => ApiError::Forbidden,
            GateError::Store(error) => {
                tracing::error!("Could not check access: {error}");
                ApiError::Internal
            }
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Handler for requests whose method is not supported by a matched route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
