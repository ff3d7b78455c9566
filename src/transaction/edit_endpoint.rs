//! Defines the endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, Path, State, rejection::FormRejection},
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
    transaction::{Transaction, TransactionForm, TransactionID, update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn edit(
    transaction_id: TransactionID,
    form: &TransactionForm,
    state: &EditTransactionState,
) -> Result<Transaction, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let new_transaction = form.validate(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(transaction_id, new_transaction, &connection)
}

/// A route handler for replacing the fields of a transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    HxRequest(is_htmx): HxRequest,
    Path(transaction_id): Path<TransactionID>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return ApiError::from(rejection).into_response_for(is_htmx),
    };

    match edit(transaction_id, &form, &state) {
        Ok(_) if is_htmx => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => {
            tracing::debug!("Could not update transaction {transaction_id}: {error}");
            ApiError::from(error).into_response_for(is_htmx)
        }
    }
}
