//! Creates the application database schema.

use rusqlite::Connection;

use crate::{
    Error, auth::create_session_table, transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the all of the database tables for the application.
///
/// Foreign keys are enabled on `connection` since sessions and transactions
/// reference their user and must be removed together with it.
///
/// # Errors
/// This function will return an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_session_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
