//! The page where administrators manage user accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Identity,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    table::{CellValue, Column, ModalKind, TableConfig, TableProps, TableQuery, TableRecord, table_view},
    user::{MIN_PASSWORD_LENGTH, Role, User, get_all_users},
};

/// The state needed for the users page.
#[derive(Debug, Clone)]
pub struct UsersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UsersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A row of the users table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: Role,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role,
        }
    }
}

impl TableRecord for UserRow {
    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn cells(&self) -> Vec<(&'static str, CellValue)> {
        vec![
            ("name", self.name.as_str().into()),
            ("email", self.email.as_str().into()),
            ("role", self.role.as_str().into()),
        ]
    }
}

fn users_table_config() -> TableConfig {
    TableConfig {
        title: "Users",
        path: endpoints::USERS_VIEW,
        columns: vec![
            Column::new("name", "Name"),
            Column::new("email", "Email"),
            Column::new("role", "Role"),
        ],
        add_kind: ModalKind::User,
    }
}

fn role_select(selected: Role) -> Markup {
    html! {
        div
        {
            label for="role" class=(FORM_LABEL_STYLE) { "Role" }

            select name="role" id="role" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for role in [Role::User, Role::Admin] {
                    option value=(role.as_str()) selected[role == selected] { (role) }
                }
            }
        }
    }
}

fn text_input(name: &str, label: &str, type_: &str, value: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(value);
        }
    }
}

/// The form for creating a user, or editing `selected`.
fn user_form(selected: Option<&UserRow>) -> Markup {
    match selected {
        None => html! {
            form
                hx-post=(endpoints::USERS_API)
                hx-target-error="#alert-container"
                class="space-y-4 mb-4"
            {
                h2 class="text-lg font-semibold" { "New User" }

                (text_input("email", "Email", "email", ""))
                (text_input("name", "Name", "text", ""))
                (role_select(Role::User))

                div
                {
                    label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                    input
                        type="password"
                        name="password"
                        id="password"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        minlength=(MIN_PASSWORD_LENGTH);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create User" }
            }
        },
        Some(user) => {
            let user_url = format_endpoint(endpoints::USER_API, user.id);

            html! {
                form
                    hx-put=(user_url)
                    hx-target-error="#alert-container"
                    class="space-y-4 mb-4"
                {
                    h2 class="text-lg font-semibold" { "Edit " (user.email) }

                    (text_input("name", "Name", "text", &user.name))
                    (role_select(user.role))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }

                button
                    type="button"
                    hx-delete=(user_url)
                    hx-confirm={ "Are you sure you want to delete " (user.email) "? Their transactions will be deleted too." }
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete user"
                }
            }
        }
    }
}

fn users_view(identity: &Identity, users: &[UserRow], query: &TableQuery) -> Markup {
    let config = users_table_config();
    let state = query.table_state();
    let view = state.derive(users);
    let modal = query.modal_state(&config, users);
    let modal = modal.is_open().then(|| user_form(modal.selected()));

    let table = table_view(TableProps {
        config: &config,
        state: &state,
        view: &view,
        can_edit: true,
        modal,
    });

    let content = html! {
        (NavBar::new(endpoints::USERS_VIEW, identity.role).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (table)
        }
    };

    base("Users", &[], &content)
}

/// Display the users table. Only administrators can reach this page.
pub async fn get_users_page(
    State(state): State<UsersPageState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TableQuery>,
) -> Response {
    let users = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_all_users(&connection));

    match users {
        Ok(users) => {
            let rows = users.into_iter().map(UserRow::from).collect::<Vec<_>>();
            users_view(&identity, &rows, &query).into_response()
        }
        Err(error) => error.into_response(),
    }
}
