//! Defines the endpoint for listing transactions as JSON.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::ApiError,
    auth::Identity,
    transaction::{TransactionScope, get_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns the transactions visible to the session's user, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    let transactions = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_transactions(TransactionScope::from(&identity), &connection));

    match transactions {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => ApiError::from(error).into_response(),
    }
}
