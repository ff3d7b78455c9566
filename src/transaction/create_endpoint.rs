//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::ApiError,
    endpoints,
    timezone::get_local_date,
    transaction::{Transaction, TransactionForm, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn create(form: &TransactionForm, state: &CreateTransactionState) -> Result<Transaction, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let new_transaction = form.validate(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_transaction(new_transaction, &connection)
}

/// A route handler for creating a new transaction.
///
/// HTMX clients are redirected to the transactions page, other clients receive
/// the new transaction as JSON with the status code 201.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    HxRequest(is_htmx): HxRequest,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return ApiError::from(rejection).into_response_for(is_htmx),
    };

    match create(&form, &state) {
        Ok(transaction) => {
            tracing::info!(
                "Created transaction {} for user {}",
                transaction.id,
                transaction.owner_id
            );

            if is_htmx {
                (
                    HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                    StatusCode::SEE_OTHER,
                )
                    .into_response()
            } else {
                (StatusCode::CREATED, Json(transaction)).into_response()
            }
        }
        Err(error) => {
            tracing::debug!("Could not create transaction: {error}");
            ApiError::from(error).into_response_for(is_htmx)
        }
    }
}
