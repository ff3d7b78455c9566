//! The transactions page.
//!
//! Everyone can see the table, scoped to their own transactions unless they
//! are an administrator. Only administrators get the add and edit modal.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    table::{
        CellValue, Column, ModalKind, TableConfig, TableProps, TableQuery, TableRecord, table_view,
    },
    timezone::get_local_date,
    transaction::{OwnedTransaction, TransactionScope, get_owned_transactions},
    user::{Role, User, get_all_users},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A row of the transactions table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    id: i64,
    date: Date,
    description: String,
    amount: f64,
    owner_id: i64,
    owner_name: String,
    owner_email: String,
    search_blob: String,
}

impl From<OwnedTransaction> for TransactionRow {
    fn from(owned: OwnedTransaction) -> Self {
        let search_blob = format!(
            "{} {} {} {}",
            owned.transaction.date,
            owned.transaction.description,
            owned.owner_name,
            owned.owner_email
        )
        .to_lowercase();

        Self {
            id: owned.transaction.id,
            date: owned.transaction.date,
            description: owned.transaction.description,
            amount: owned.transaction.amount,
            owner_id: owned.transaction.owner_id.as_i64(),
            owner_name: owned.owner_name,
            owner_email: owned.owner_email,
            search_blob,
        }
    }
}

impl TableRecord for TransactionRow {
    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("date", self.date.to_string().into()),
            ("description", self.description.as_str().into()),
            ("amount", self.amount.into()),
            (
                "owner",
                CellValue::Nested(vec![
                    ("name".to_owned(), self.owner_name.as_str().into()),
                    ("email".to_owned(), self.owner_email.as_str().into()),
                ]),
            ),
        ]
    }

    fn search_blob(&self) -> Option<String> {
        Some(self.search_blob.clone())
    }

    fn display_cell(&self, key: &str) -> String {
        match key {
            "amount" => format_currency(self.amount),
            key => self.cell(key).to_string(),
        }
    }
}

fn transactions_table_config() -> TableConfig {
    TableConfig {
        title: "Transactions",
        path: endpoints::TRANSACTIONS_VIEW,
        columns: vec![
            Column::new("date", "Date"),
            Column::new("description", "Description"),
            Column::new("amount", "Amount"),
            Column::new("owner", "Owner"),
        ],
        add_kind: ModalKind::Income,
    }
}

/// The values shown in the transaction form.
struct FormValues<'a> {
    owner_id: i64,
    amount: String,
    date: Date,
    description: &'a str,
}

fn transaction_form_fields(values: &FormValues<'_>, users: &[User], max_date: Date) -> Markup {
    html! {
        div
        {
            label for="owner_id" class=(FORM_LABEL_STYLE) { "Owner" }

            select name="owner_id" id="owner_id" class=(FORM_TEXT_INPUT_STYLE) required
            {
                @for user in users {
                    option
                        value=(user.id)
                        selected[user.id.as_i64() == values.owner_id]
                    {
                        (user.name) " (" (user.email) ")"
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    required
                    value=(values.amount)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                "Use a negative amount for expenses."
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                type="date"
                name="date"
                id="date"
                required
                max=(max_date)
                value=(values.date)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                type="text"
                name="description"
                id="description"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The form for creating a transaction, or editing `selected`.
fn transaction_form(selected: Option<&TransactionRow>, users: &[User], today: Date) -> Markup {
    match selected {
        None => {
            let values = FormValues {
                owner_id: users.first().map_or(0, |user| user.id.as_i64()),
                amount: String::new(),
                date: today,
                description: "",
            };

            html! {
                form
                    hx-post=(endpoints::TRANSACTIONS_API)
                    hx-target-error="#alert-container"
                    class="space-y-4 mb-4"
                {
                    h2 class="text-lg font-semibold" { "New Transaction" }

                    (transaction_form_fields(&values, users, today))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Transaction" }
                }
            }
        }
        Some(row) => {
            let transaction_url = format_endpoint(endpoints::TRANSACTION_API, row.id);
            let values = FormValues {
                owner_id: row.owner_id,
                amount: format!("{:.2}", row.amount),
                date: row.date,
                description: &row.description,
            };

            html! {
                form
                    hx-put=(transaction_url)
                    hx-target-error="#alert-container"
                    class="space-y-4 mb-4"
                {
                    h2 class="text-lg font-semibold" { "Edit Transaction" }

                    (transaction_form_fields(&values, users, today))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }

                button
                    type="button"
                    hx-delete=(transaction_url)
                    hx-confirm={ "Are you sure you want to delete '" (row.description) "'?" }
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete transaction"
                }
            }
        }
    }
}

fn transactions_view(
    identity: &Identity,
    rows: &[TransactionRow],
    users: &[User],
    query: &TableQuery,
    today: Date,
) -> Markup {
    let config = transactions_table_config();
    let can_edit = identity.role == Role::Admin;
    let state = query.table_state();
    let view = state.derive(rows);
    let modal = if can_edit {
        let modal = query.modal_state(&config, rows);
        modal
            .is_open()
            .then(|| transaction_form(modal.selected(), users, today))
    } else {
        None
    };

    let table = table_view(TableProps {
        config: &config,
        state: &state,
        view: &view,
        can_edit,
        modal,
    });

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW, identity.role).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (table)
        }
    };

    base("Transactions", &[dollar_input_styles()], &content)
}

/// Display the transactions table.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TableQuery>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let page_data = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let transactions =
                get_owned_transactions(TransactionScope::from(&identity), &connection)?;
            // Only administrators see the form that lists the other users.
            let users = match identity.role {
                Role::Admin => get_all_users(&connection)?,
                Role::User => Vec::new(),
            };

            Ok((transactions, users))
        });

    match page_data {
        Ok((transactions, users)) => {
            let rows = transactions
                .into_iter()
                .map(TransactionRow::from)
                .collect::<Vec<_>>();
            transactions_view(&identity, &rows, &users, &query, today).into_response()
        }
        Err(error) => error.into_response(),
    }
}
