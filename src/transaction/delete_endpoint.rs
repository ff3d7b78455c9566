//! Defines the endpoint for deleting a transaction.

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
    transaction::{TransactionID, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Responds with `{"id": transaction_id}`, or redirects HTMX clients to the transactions page.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    HxRequest(is_htmx): HxRequest,
    Path(transaction_id): Path<TransactionID>,
) -> Response {
    let deleted = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| delete_transaction(transaction_id, &connection));

    match deleted {
        Ok(()) if is_htmx => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::OK,
        )
            .into_response(),
        Ok(()) => Json(json!({ "id": transaction_id })).into_response(),
        Err(error) => ApiError::from(error).into_response_for(is_htmx),
    }
}
