//! Server side sessions.
//!
//! A session binds a random token to a user until an expiry time. Only the
//! token is sent to the client, inside an encrypted private cookie.

use std::{cmp::max, fmt::Display};

use rand::{RngCore, rngs::OsRng};
use rusqlite::{Connection, Row};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::UserID};

/// The number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// An opaque, unguessable session identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new token from the operating system's secure random number generator.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Wrap a token read from a cookie or the database.
    pub fn new_unchecked(raw_token: &str) -> Self {
        Self(raw_token.to_owned())
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Only a prefix of the token is shown so that logs cannot be used to hijack a session.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = self.0.chars().take(6).collect::<String>();

        write!(f, "SessionToken({prefix}...)")
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A logged in user's session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserID,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Create the session table.
///
/// Sessions are removed along with their user.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS session (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_session_user_id ON session(user_id);",
    )?;

    Ok(())
}

/// Start a new session for `user_id` that lasts `duration` from `now`.
///
/// # Errors
///
/// Returns [Error::DateError] if the expiry overflows, or an SQL error if the
/// user does not exist.
pub fn create_session(
    user_id: UserID,
    duration: Duration,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Session, Error> {
    let expires_at = expiry_from(now, duration)?;
    let token = SessionToken::generate();

    connection.execute(
        "INSERT INTO session (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
        (
            token.as_ref(),
            user_id.as_i64(),
            expires_at.unix_timestamp(),
        ),
    )?;

    Ok(Session {
        token,
        user_id,
        expires_at,
    })
}

/// Get the session for `token`, whether or not it has expired.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no session for `token`.
pub fn get_session(token: &SessionToken, connection: &Connection) -> Result<Session, Error> {
    connection
        .prepare("SELECT token, user_id, expires_at FROM session WHERE token = :token")?
        .query_row(&[(":token", token.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Extend the session so that it lasts at least `duration` from `now`.
///
/// The expiry never moves backwards, so a "remember me" session keeps its
/// longer expiry.
///
/// # Errors
///
/// Returns [Error::NotFound] if the session does not exist.
pub fn touch_session(
    token: &SessionToken,
    duration: Duration,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Session, Error> {
    let session = get_session(token, connection)?;
    let expires_at = max(session.expires_at, expiry_from(now, duration)?);

    connection.execute(
        "UPDATE session SET expires_at = ?1 WHERE token = ?2",
        (expires_at.unix_timestamp(), token.as_ref()),
    )?;

    Ok(Session {
        expires_at,
        ..session
    })
}

/// End a session. Deleting a session that does not exist is not an error.
pub fn delete_session(token: &SessionToken, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM session WHERE token = ?1", [token.as_ref()])?;

    Ok(())
}

/// Remove every session that expired at or before `now`, returning how many were removed.
pub fn delete_expired_sessions(now: OffsetDateTime, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM session WHERE expires_at <= ?1",
            [now.unix_timestamp()],
        )
        .map_err(|error| error.into())
}

fn expiry_from(now: OffsetDateTime, duration: Duration) -> Result<OffsetDateTime, Error> {
    now.checked_add(duration).ok_or(Error::DateError)
}

fn map_row(row: &Row) -> Result<Session, rusqlite::Error> {
    let raw_token: String = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let timestamp: i64 = row.get(2)?;

    let expires_at = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(error))
    })?;

    Ok(Session {
        token: SessionToken::new_unchecked(&raw_token),
        user_id,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        user::{Email, NewUser, PasswordHash, Role, User, UserName, create_user, delete_user},
    };

    use super::{
        SessionToken, create_session, delete_expired_sessions, delete_session, get_session,
        touch_session,
    };

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

    fn get_db_connection() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            NewUser {
                email: Email::new_unchecked("ann@example.com"),
                name: UserName::new_unchecked("Ann"),
                role: Role::Admin,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .unwrap();

        (connection, user)
    }

    #[test]
    fn tokens_are_random_hex() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_ref().len(), 64);
        assert!(first.as_ref().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_output_hides_most_of_token() {
        let token = SessionToken::new_unchecked("abcdef0123456789");

        assert_eq!(format!("{token:?}"), "SessionToken(abcdef...)");
    }

    #[test]
    fn create_then_get_session() {
        let (connection, user) = get_db_connection();

        let session = create_session(user.id, Duration::minutes(5), NOW, &connection).unwrap();

        assert_eq!(session.expires_at, NOW + Duration::minutes(5));
        assert_eq!(get_session(&session.token, &connection), Ok(session));
    }

    #[test]
    fn get_unknown_session_fails() {
        let (connection, _) = get_db_connection();

        let result = get_session(&SessionToken::new_unchecked("nope"), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn touch_extends_expiry() {
        let (connection, user) = get_db_connection();
        let session = create_session(user.id, Duration::minutes(5), NOW, &connection).unwrap();
        let later = NOW + Duration::minutes(4);

        let touched =
            touch_session(&session.token, Duration::minutes(5), later, &connection).unwrap();

        assert_eq!(touched.expires_at, later + Duration::minutes(5));
        assert_eq!(
            get_session(&session.token, &connection).unwrap().expires_at,
            touched.expires_at
        );
    }

    #[test]
    fn touch_never_shortens_expiry() {
        let (connection, user) = get_db_connection();
        let session = create_session(user.id, Duration::days(7), NOW, &connection).unwrap();

        let touched =
            touch_session(&session.token, Duration::minutes(5), NOW, &connection).unwrap();

        assert_eq!(touched.expires_at, NOW + Duration::days(7));
    }

    #[test]
    fn deleted_session_is_gone() {
        let (connection, user) = get_db_connection();
        let session = create_session(user.id, Duration::minutes(5), NOW, &connection).unwrap();

        delete_session(&session.token, &connection).unwrap();

        assert_eq!(
            get_session(&session.token, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_expired_sessions_keeps_live_ones() {
        let (connection, user) = get_db_connection();
        let expired = create_session(user.id, Duration::minutes(1), NOW, &connection).unwrap();
        let live = create_session(user.id, Duration::hours(1), NOW, &connection).unwrap();

        let removed =
            delete_expired_sessions(NOW + Duration::minutes(2), &connection).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(get_session(&expired.token, &connection), Err(Error::NotFound));
        assert!(get_session(&live.token, &connection).is_ok());
    }

    #[test]
    fn sessions_are_deleted_with_user() {
        let (connection, user) = get_db_connection();
        // A second admin so that the first one may be deleted.
        create_user(
            NewUser {
                email: Email::new_unchecked("bob@example.com"),
                name: UserName::new_unchecked("Bob"),
                role: Role::Admin,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .unwrap();
        let session = create_session(user.id, Duration::minutes(5), NOW, &connection).unwrap();

        delete_user(user.id, &connection).unwrap();

        assert_eq!(
            get_session(&session.token, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn expiry_is_exclusive() {
        let (connection, user) = get_db_connection();
        let session = create_session(user.id, Duration::minutes(5), NOW, &connection).unwrap();

        assert!(!session.is_expired(NOW));
        assert!(session.is_expired(NOW + Duration::minutes(5)));
    }
}
