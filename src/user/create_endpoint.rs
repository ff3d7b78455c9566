//! Defines the endpoint for creating a user.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::ApiError,
    endpoints,
    user::{
        Email, NewUser, NewUserForm, PasswordHash, Role, User, UserName, UserResponse, create_user,
    },
};

/// The state needed to create a user.
#[derive(Debug, Clone)]
pub struct CreateUserState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for the new user's password.
    pub password_cost: u32,
}

impl FromRef<AppState> for CreateUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// Validate the form and hash the password.
fn parse_new_user(form: &NewUserForm, password_cost: u32) -> Result<NewUser, Error> {
    let email = Email::new(&form.email)?;
    let name = UserName::new(&form.name)?;
    let role: Role = form.role.parse()?;
    let password_hash = PasswordHash::from_raw_password(
        &form.password,
        &[email.as_ref(), name.as_ref()],
        password_cost,
    )?;

    Ok(NewUser {
        email,
        name,
        role,
        password_hash,
    })
}

fn create(form: &NewUserForm, state: &CreateUserState) -> Result<User, Error> {
    let new_user = parse_new_user(form, state.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    create_user(new_user, &connection)
}

/// A route handler for creating a user.
///
/// HTMX clients are redirected to the users page, other clients receive the
/// new user as JSON with the status code 201.
pub async fn create_user_endpoint(
    State(state): State<CreateUserState>,
    HxRequest(is_htmx): HxRequest,
    form: Result<Form<NewUserForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return ApiError::from(rejection).into_response_for(is_htmx),
    };

    match create(&form, &state) {
        Ok(user) if is_htmx => {
            tracing::info!("Created user {} with role {}", user.id, user.role);
            (
                HxRedirect(endpoints::USERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Ok(user) => {
            tracing::info!("Created user {} with role {}", user.id, user.role);
            (StatusCode::CREATED, Json(UserResponse::from(user))).into_response()
        }
        Err(error) => ApiError::from(error).into_response_for(is_htmx),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::StatusCode,
    };
    use axum_htmx::HxRequest;
    use serde_json::json;

    use crate::{
        endpoints,
        test_utils::{
            assert_hx_redirect, assert_json_error, must_create_seeded_connection, parse_json,
        },
        user::{Email, NewUserForm, Role, count_users, get_user_by_email},
    };

    use super::{CreateUserState, create_user_endpoint};

    fn get_state() -> CreateUserState {
        let (connection, _, _) = must_create_seeded_connection();

        CreateUserState {
            db_connection: Arc::new(Mutex::new(connection)),
            password_cost: 4,
        }
    }

    fn form(email: &str, role: &str) -> NewUserForm {
        NewUserForm {
            email: email.to_owned(),
            name: "Cat".to_owned(),
            role: role.to_owned(),
            password: "asomewhatlongpassword1".to_owned(),
        }
    }

    #[tokio::test]
    async fn creates_user_and_returns_json() {
        let state = get_state();

        let response = create_user_endpoint(
            State(state.clone()),
            HxRequest(false),
            Ok(Form(form("cat@example.com", "user"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            parse_json(response).await,
            json!({"id": 3, "email": "cat@example.com", "name": "Cat", "role": "user"})
        );
        let user = get_user_by_email(
            &Email::new_unchecked("cat@example.com"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.password_hash.verify("asomewhatlongpassword1"), Ok(true));
    }

    #[tokio::test]
    async fn htmx_create_redirects_to_users_page() {
        let response = create_user_endpoint(
            State(get_state()),
            HxRequest(true),
            Ok(Form(form("cat@example.com", "admin"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::USERS_VIEW);
    }

    #[tokio::test]
    async fn duplicate_email_is_invalid_body() {
        let state = get_state();

        let response = create_user_endpoint(
            State(state.clone()),
            HxRequest(false),
            Ok(Form(form("Bob@example.com", "user"))),
        )
        .await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_body").await;
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(2));
    }

    #[tokio::test]
    async fn unknown_role_is_invalid_body() {
        let response = create_user_endpoint(
            State(get_state()),
            HxRequest(false),
            Ok(Form(form("cat@example.com", "superuser"))),
        )
        .await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_body").await;
    }

    #[tokio::test]
    async fn weak_password_is_invalid_body() {
        let response = create_user_endpoint(
            State(get_state()),
            HxRequest(false),
            Ok(Form(NewUserForm {
                password: "password".to_owned(),
                ..form("cat@example.com", "user")
            })),
        )
        .await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_body").await;
    }

    #[tokio::test]
    async fn htmx_error_is_an_alert() {
        let response = create_user_endpoint(
            State(get_state()),
            HxRequest(true),
            Ok(Form(form("not an email", "user"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = crate::test_utils::parse_html_fragment(response).await;
        assert!(
            !crate::test_utils::select_text(&html, "#alert-container").is_empty(),
            "want an alert"
        );
    }
}
