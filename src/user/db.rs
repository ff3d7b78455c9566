//! Database operations for users.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    user::{Email, NewUser, PasswordHash, Role, User, UserID, UserName},
};

/// Code 2067 occurs when a UNIQUE constraint failed.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('admin', 'user')),
            password TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if the email is already used by another user, or
/// [Error::SqlError] if an unexpected SQL error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (email, name, role, password) VALUES (?1, ?2, ?3, ?4)",
            (
                new_user.email.as_ref(),
                new_user.name.as_ref(),
                new_user.role.as_str(),
                new_user.password_hash.as_ref(),
            ),
        )
        .map_err(|error| map_unique_email_error(error, &new_user.email))?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        name: new_user.name,
        role: new_user.role,
        password_hash: new_user.password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, name, role, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user with the email address `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email address.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, name, role, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Get every user ordered by name.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, email, name, role, password FROM user ORDER BY name COLLATE NOCASE, id")?
        .query_map([], map_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Get the role of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_role(user_id: UserID, connection: &Connection) -> Result<Role, Error> {
    let raw_role: String = connection.query_row(
        "SELECT role FROM user WHERE id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    raw_role.parse()
}

/// Change the name and role of a user.
///
/// # Errors
///
/// Returns [Error::LastAdmin] if the change would demote the last administrator, or
/// [Error::NotFound] if the user does not exist.
pub fn update_user(
    user_id: UserID,
    name: &UserName,
    role: Role,
    connection: &Connection,
) -> Result<User, Error> {
    let transaction = connection.unchecked_transaction()?;
    let user = get_user_by_id(user_id, &transaction)?;

    if user.role == Role::Admin && role != Role::Admin && count_admins(&transaction)? <= 1 {
        return Err(Error::LastAdmin);
    }

    transaction.execute(
        "UPDATE user SET name = ?1, role = ?2 WHERE id = ?3",
        (name.as_ref(), role.as_str(), user_id.as_i64()),
    )?;
    transaction.commit()?;

    Ok(User {
        name: name.clone(),
        role,
        ..user
    })
}

/// Replace the password of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a user along with their sessions and transactions.
///
/// # Errors
///
/// Returns [Error::LastAdmin] if the user is the last administrator, or
/// [Error::NotFound] if the user does not exist.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;
    let role = get_user_role(user_id, &transaction)?;

    if role == Role::Admin && count_admins(&transaction)? <= 1 {
        return Err(Error::LastAdmin);
    }

    transaction.execute("DELETE FROM user WHERE id = ?1", [user_id.as_i64()])?;
    transaction.commit()?;

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    query_count("SELECT COUNT(id) FROM user;", connection)
}

/// Get the number of administrators.
pub fn count_admins(connection: &Connection) -> Result<usize, Error> {
    query_count("SELECT COUNT(id) FROM user WHERE role = 'admin';", connection)
}

fn query_count(query: &str, connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row(query, [], |row| row.get(0))?;

    usize::try_from(count)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count).into())
}

fn map_unique_email_error(error: rusqlite::Error, email: &Email) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, Some(ref description))
            if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE
                && description.contains("email") =>
        {
            Error::DuplicateEmail(email.to_string())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let raw_email: String = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let raw_role: String = row.get(3)?;
    let raw_password_hash: String = row.get(4)?;

    let role = raw_role.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(User {
        id,
        email: Email::new_unchecked(&raw_email),
        name: UserName::new_unchecked(&raw_name),
        role,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
