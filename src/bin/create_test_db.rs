use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use tallybook::{
    Email, NewTransaction, NewUser, PasswordHash, Role, User, UserName, ValidatedPassword,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the tallybook server.
///
/// Both test accounts use the password "test".
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test users...");
    let admin = create_test_user("admin@example.com", "Admin", Role::Admin, &conn)?;
    let user = create_test_user("user@example.com", "User", Role::User, &conn)?;

    println!("Creating sample transactions...");
    let today = OffsetDateTime::now_utc().date();

    for (owner, amount, days_ago, description) in [
        (&admin, 3200.0, 60, "Salary"),
        (&admin, -1450.0, 58, "Rent"),
        (&user, -86.4, 45, "Groceries"),
        (&admin, 3200.0, 30, "Salary"),
        (&user, 120.0, 20, "Sold old bike"),
        (&user, -12.5, 3, "Lunch"),
        (&admin, -54.99, 1, "Internet"),
    ] {
        let new_transaction = NewTransaction::new(
            owner.id,
            amount,
            today - Duration::days(days_ago),
            description,
            today,
        )?;

        create_transaction(new_transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}

fn create_test_user(
    email: &str,
    name: &str,
    role: Role,
    conn: &Connection,
) -> Result<User, Box<dyn Error>> {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            email: Email::new(email)?,
            name: UserName::new(name)?,
            role,
            password_hash,
        },
        conn,
    )?;

    Ok(user)
}
