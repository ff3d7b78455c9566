use rusqlite::Connection;

use crate::{
    db::initialize,
    user::{Email, NewUser, PasswordHash, Role, User, UserName, create_user},
};

/// An initialized in-memory database.
#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user whose password is "hunter2" hashed with bcrypt's lowest cost.
#[track_caller]
pub(crate) fn must_create_user(email: &str, name: &str, role: Role, connection: &Connection) -> User {
    let password_hash =
        PasswordHash::new_unchecked(&bcrypt::hash("hunter2", 4).expect("Could not hash password"));

    create_user(
        NewUser {
            email: Email::new_unchecked(email),
            name: UserName::new_unchecked(name),
            role,
            password_hash,
        },
        connection,
    )
    .expect("Could not create test user")
}

/// A database with an administrator, Ann (ID 1), and a user, Bob (ID 2).
#[track_caller]
pub(crate) fn must_create_seeded_connection() -> (Connection, User, User) {
    let connection = must_create_test_connection();
    let admin = must_create_user("ann@example.com", "Ann", Role::Admin, &connection);
    let user = must_create_user("bob@example.com", "Bob", Role::User, &connection);

    (connection, admin, user)
}
