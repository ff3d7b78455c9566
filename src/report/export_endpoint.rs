//! Exports the visible transactions as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    api_error::ApiError,
    auth::Identity,
    transaction::{OwnedTransaction, TransactionScope, get_owned_transactions},
};

const EXPORT_CONTENT_DISPOSITION: &str = "attachment; filename=\"transactions.csv\"";

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One line of the exported file. The field order sets the column order.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    date: String,
    description: &'a str,
    amount: f64,
    owner: &'a str,
}

/// Write `transactions` as CSV with the header `date,description,amount,owner`.
///
/// # Errors
///
/// Returns [Error::CsvError] if a record could not be written.
pub fn write_transactions_csv(transactions: &[OwnedTransaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Serializing writes the header with the first record, so an empty export
    // needs the header written by hand.
    if transactions.is_empty() {
        writer
            .write_record(["date", "description", "amount", "owner"])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    for owned in transactions {
        writer
            .serialize(ExportRecord {
                date: owned.transaction.date.to_string(),
                description: &owned.transaction.description,
                amount: owned.transaction.amount,
                owner: &owned.owner_email,
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler that downloads the transactions visible to the session's user as CSV.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    let csv = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            get_owned_transactions(TransactionScope::from(&identity), &connection)
        })
        .and_then(|transactions| write_transactions_csv(&transactions));

    match csv {
        Ok(csv) => (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/csv; charset=utf-8"),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_static(EXPORT_CONTENT_DISPOSITION),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => ApiError::from(error).into_response(),
    }
}
