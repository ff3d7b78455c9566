//! Defines the endpoint for listing users as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::ApiError,
    user::{UserResponse, get_all_users},
};

/// The state needed to list users.
#[derive(Debug, Clone)]
pub struct ListUsersState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListUsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns every user, ordered by name.
pub async fn list_users_endpoint(State(state): State<ListUsersState>) -> Response {
    let users = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_all_users(&connection));

    match users {
        Ok(users) => Json(
            users
                .into_iter()
                .map(UserResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => ApiError::from(error).into_response(),
    }
}
