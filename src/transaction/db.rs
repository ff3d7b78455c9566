//! Database queries for transactions.
//!
//! Every listing is a single query filtered in SQL by its [TransactionScope].

use rusqlite::{Connection, Row};

use crate::{
    Error,
    transaction::{NewTransaction, OwnedTransaction, Transaction, TransactionID, TransactionScope},
    user::UserID,
};

/// Create the transaction table.
///
/// Transactions are deleted together with their owner.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            owner_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_owner_date
        ON \"transaction\"(owner_id, date);",
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::InvalidOwner] if the owner ID does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let owner_id = new_transaction.owner_id();

    connection
        .prepare(
            "INSERT INTO \"transaction\" (owner_id, amount, date, description)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, owner_id, amount, date, description",
        )?
        .query_row(
            (
                owner_id.as_i64(),
                new_transaction.amount(),
                new_transaction.date(),
                new_transaction.description(),
            ),
            map_transaction_row,
        )
        .map_err(|error| map_owner_error(error, owner_id))
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn get_transaction(id: TransactionID, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, date, description FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the transactions owned by `owner_id`, newest first.
pub fn get_transactions_for_owner(
    owner_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, date, description FROM \"transaction\"
             WHERE owner_id = :owner_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":owner_id", &owner_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get every transaction, newest first.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, amount, date, description FROM \"transaction\"
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the transactions visible in `scope`, newest first.
pub fn get_transactions(
    scope: TransactionScope,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    match scope {
        TransactionScope::All => get_all_transactions(connection),
        TransactionScope::Owner(owner_id) => get_transactions_for_owner(owner_id, connection),
    }
}

/// Get the transactions visible in `scope` with the name and email of their owners.
pub fn get_owned_transactions(
    scope: TransactionScope,
    connection: &Connection,
) -> Result<Vec<OwnedTransaction>, Error> {
    const SELECT: &str = "SELECT t.id, t.owner_id, t.amount, t.date, t.description, u.name, u.email
        FROM \"transaction\" t
        INNER JOIN user u ON u.id = t.owner_id";

    let rows = match scope {
        TransactionScope::All => connection
            .prepare(&format!("{SELECT} ORDER BY t.date DESC, t.id DESC"))?
            .query_map([], map_owned_row)?
            .collect::<Result<Vec<_>, _>>()?,
        TransactionScope::Owner(owner_id) => connection
            .prepare(&format!(
                "{SELECT} WHERE t.owner_id = ?1 ORDER BY t.date DESC, t.id DESC"
            ))?
            .query_map([owner_id.as_i64()], map_owned_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(rows)
}

/// Replace the fields of the transaction `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no transaction with `id`, or
/// [Error::InvalidOwner] if the new owner does not exist.
pub fn update_transaction(
    id: TransactionID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let owner_id = new_transaction.owner_id();

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET owner_id = ?1, amount = ?2, date = ?3, description = ?4
             WHERE id = ?5
             RETURNING id, owner_id, amount, date, description",
        )?
        .query_row(
            (
                owner_id.as_i64(),
                new_transaction.amount(),
                new_transaction.date(),
                new_transaction.description(),
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_owner_error(error, owner_id))
}

/// Delete the transaction `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn delete_transaction(id: TransactionID, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_owner_error(error: rusqlite::Error, owner_id: UserID) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidOwner(owner_id),
        error => error.into(),
    }
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
    })
}

fn map_owned_row(row: &Row) -> Result<OwnedTransaction, rusqlite::Error> {
    Ok(OwnedTransaction {
        transaction: map_transaction_row(row)?,
        owner_name: row.get(5)?,
        owner_email: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        test_utils::must_create_seeded_connection,
        transaction::{NewTransaction, TransactionScope},
        user::{UserID, delete_user},
    };

    use super::{
        create_transaction, delete_transaction, get_all_transactions, get_owned_transactions,
        get_transaction, get_transactions_for_owner, update_transaction,
    };

    const TODAY: time::Date = date!(2025 - 06 - 15);

    fn new_transaction(owner: i64, amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction::new(UserID::new(owner), amount, date, "test", TODAY).unwrap()
    }

    #[test]
    fn create_and_get_transaction() {
        let (connection, _, bob) = must_create_seeded_connection();

        let created =
            create_transaction(new_transaction(bob.id.as_i64(), -4.5, TODAY), &connection)
                .unwrap();

        assert_eq!(created.owner_id, bob.id);
        assert_eq!(created.amount, -4.5);
        assert_eq!(get_transaction(created.id, &connection), Ok(created));
    }

    #[test]
    fn create_with_unknown_owner_fails() {
        let (connection, _, _) = must_create_seeded_connection();

        let result = create_transaction(new_transaction(42, 1.0, TODAY), &connection);

        assert_eq!(result, Err(Error::InvalidOwner(UserID::new(42))));
    }

    #[test]
    fn get_missing_transaction_is_not_found() {
        let (connection, _, _) = must_create_seeded_connection();

        assert_eq!(get_transaction(7, &connection), Err(Error::NotFound));
    }

    #[test]
    fn owner_query_only_returns_own_transactions_newest_first() {
        let (connection, ann, bob) = must_create_seeded_connection();
        create_transaction(new_transaction(ann.id.as_i64(), 1.0, TODAY), &connection).unwrap();
        let older = create_transaction(
            new_transaction(bob.id.as_i64(), 2.0, date!(2025 - 01 - 01)),
            &connection,
        )
        .unwrap();
        let newer =
            create_transaction(new_transaction(bob.id.as_i64(), 3.0, TODAY), &connection)
                .unwrap();

        let transactions = get_transactions_for_owner(bob.id, &connection).unwrap();

        assert_eq!(transactions, vec![newer, older]);
        assert_eq!(get_all_transactions(&connection).unwrap().len(), 3);
    }

    #[test]
    fn owned_transactions_include_owner_details() {
        let (connection, ann, bob) = must_create_seeded_connection();
        create_transaction(new_transaction(ann.id.as_i64(), 1.0, TODAY), &connection).unwrap();
        create_transaction(new_transaction(bob.id.as_i64(), 2.0, TODAY), &connection).unwrap();

        let all = get_owned_transactions(TransactionScope::All, &connection).unwrap();
        let bobs = get_owned_transactions(TransactionScope::Owner(bob.id), &connection).unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].owner_name, "Bob");
        assert_eq!(bobs[0].owner_email, "bob@example.com");
    }

    #[test]
    fn update_replaces_fields() {
        let (connection, ann, bob) = must_create_seeded_connection();
        let created =
            create_transaction(new_transaction(ann.id.as_i64(), 1.0, TODAY), &connection)
                .unwrap();

        let updated = update_transaction(
            created.id,
            new_transaction(bob.id.as_i64(), -9.0, date!(2025 - 02 - 03)),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.owner_id, bob.id);
        assert_eq!(updated.amount, -9.0);
        assert_eq!(get_transaction(created.id, &connection), Ok(updated));
    }

    #[test]
    fn update_missing_transaction_is_not_found() {
        let (connection, ann, _) = must_create_seeded_connection();

        let result =
            update_transaction(3, new_transaction(ann.id.as_i64(), 1.0, TODAY), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_removes_it() {
        let (connection, ann, _) = must_create_seeded_connection();
        let created =
            create_transaction(new_transaction(ann.id.as_i64(), 1.0, TODAY), &connection)
                .unwrap();

        delete_transaction(created.id, &connection).unwrap();

        assert_eq!(get_transaction(created.id, &connection), Err(Error::NotFound));
        assert_eq!(delete_transaction(created.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn deleting_owner_deletes_their_transactions() {
        let (connection, _, bob) = must_create_seeded_connection();
        let created =
            create_transaction(new_transaction(bob.id.as_i64(), 1.0, TODAY), &connection)
                .unwrap();

        delete_user(bob.id, &connection).unwrap();

        assert_eq!(get_transaction(created.id, &connection), Err(Error::NotFound));
    }
}
