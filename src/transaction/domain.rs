//! The transaction model and the forms used to create and edit transactions.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::Identity, user::{Role, UserID}};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The ID of a transaction.
pub type TransactionID = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionID,
    /// The user the transaction belongs to.
    pub owner_id: UserID,
    /// Positive amounts are income and negative amounts are expenses.
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub description: String,
}

/// A transaction together with the name and email of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedTransaction {
    pub transaction: Transaction,
    pub owner_name: String,
    pub owner_email: String,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    owner_id: UserID,
    amount: f64,
    date: Date,
    description: String,
}

impl NewTransaction {
    /// Validate the fields of a transaction.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `amount` is NaN or infinite, or
    /// [Error::FutureDate] if `date` is after `today`.
    pub fn new(
        owner_id: UserID,
        amount: f64,
        date: Date,
        description: &str,
        today: Date,
    ) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount);
        }

        if date > today {
            return Err(Error::FutureDate(date));
        }

        Ok(Self {
            owner_id,
            amount,
            date,
            description: description.trim().to_owned(),
        })
    }

    pub fn owner_id(&self) -> UserID {
        self.owner_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    pub owner_id: i64,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub description: String,
}

impl TransactionForm {
    /// Validate the form against the local date `today`.
    pub fn validate(&self, today: Date) -> Result<NewTransaction, Error> {
        NewTransaction::new(
            UserID::new(self.owner_id),
            self.amount,
            self.date,
            &self.description,
            today,
        )
    }
}

/// Which transactions a listing may contain.
///
/// Administrators see every transaction, everyone else only sees their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionScope {
    All,
    Owner(UserID),
}

impl From<&Identity> for TransactionScope {
    fn from(identity: &Identity) -> Self {
        match identity.role {
            Role::Admin => TransactionScope::All,
            Role::User => TransactionScope::Owner(identity.user_id),
        }
    }
}
