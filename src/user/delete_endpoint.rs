//! Defines the endpoint for deleting a user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error,
    api_error::ApiError,
    endpoints,
    user::{UserID, delete_user},
};

/// The state needed to delete a user.
#[derive(Debug, Clone)]
pub struct DeleteUserState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a user along with their sessions and transactions.
///
/// Responds with `{"id": user_id}`, or redirects HTMX clients to the users page.
pub async fn delete_user_endpoint(
    State(state): State<DeleteUserState>,
    HxRequest(is_htmx): HxRequest,
    Path(user_id): Path<UserID>,
) -> Response {
    let deleted = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_user(user_id, &connection));

    match deleted {
        Ok(()) => {
            tracing::info!("Deleted user {user_id}");

            if is_htmx {
                (HxRedirect(endpoints::USERS_VIEW.to_owned()), StatusCode::OK).into_response()
            } else {
                Json(json!({ "id": user_id })).into_response()
            }
        }
        Err(error) => ApiError::from(error).into_response_for(is_htmx),
    }
}
