//! Tallybook is a small web app for tracking income and expenses.
//!
//! Users record transactions, administrators manage user accounts and roles,
//! and reports are rendered and exported from the transaction history.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! small JSON API guarded by role-based access control.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod api_error;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod forbidden;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod table;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use api_error::ApiError;
pub use app_state::{AppState, create_cookie_key};
pub use auth::{GateError, Identity, delete_expired_sessions};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::{get_local_date, get_local_offset};
pub use transaction::{NewTransaction, Transaction, create_transaction};
pub use user::{
    Email, NewUser, PasswordHash, Role, User, UserID, UserName, ValidatedPassword, create_user,
    get_user_by_email, update_password,
};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string could not be parsed as an email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("the email address {0} is already in use")]
    DuplicateEmail(String),

    /// The string is not one of the known roles.
    #[error("\"{0}\" is not a valid role")]
    InvalidRole(String),

    /// An empty string was given where a name is required.
    #[error("name cannot be empty")]
    EmptyName,

    /// The change would leave the application without an administrator.
    #[error("the last administrator cannot be removed or demoted")]
    LastAdmin,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The amount of a transaction is not a finite number.
    #[error("the amount must be a finite number")]
    InvalidAmount,

    /// The owner ID used for a transaction does not refer to a user.
    #[error("the owner ID does not refer to a valid user")]
    InvalidOwner(UserID),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The session expiry could not be computed or formatted.
    #[error("could not compute the session expiry")]
    DateError,

    /// The report could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
