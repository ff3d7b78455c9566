//! Defines the endpoint for changing a user's name and role.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxRedirect, HxRequest};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api_error::ApiError,
    endpoints,
    user::{EditUserForm, Role, User, UserID, UserName, UserResponse, update_user},
};

/// The state needed to edit a user.
#[derive(Debug, Clone)]
pub struct EditUserState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit(user_id: UserID, form: &EditUserForm, state: &EditUserState) -> Result<User, Error> {
    let name = UserName::new(&form.name)?;
    let role: Role = form.role.parse()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_user(user_id, &name, role, &connection)
}

/// A route handler for changing a user's name and role.
///
/// The last administrator cannot be demoted.
pub async fn edit_user_endpoint(
    State(state): State<EditUserState>,
    HxRequest(is_htmx): HxRequest,
    Path(user_id): Path<UserID>,
    form: Result<Form<EditUserForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return ApiError::from(rejection).into_response_for(is_htmx),
    };

    match edit(user_id, &form, &state) {
        Ok(_) if is_htmx => (
            HxRedirect(endpoints::USERS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(user) => Json(UserResponse::from(user)).into_response(),
        Err(error) => {
            tracing::debug!("Could not update user {user_id}: {error}");
            ApiError::from(error).into_response_for(is_htmx)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_htmx::HxRequest;
    use serde_json::json;

    use crate::{
        endpoints,
        test_utils::{
            assert_hx_redirect, assert_json_error, must_create_seeded_connection, parse_json,
        },
        user::{EditUserForm, Role, UserID, db::get_user_by_id},
    };

    use super::{EditUserState, edit_user_endpoint};

    fn get_state() -> EditUserState {
        let (connection, _, _) = must_create_seeded_connection();

        EditUserState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(name: &str, role: &str) -> EditUserForm {
        EditUserForm {
            name: name.to_owned(),
            role: role.to_owned(),
        }
    }

    #[tokio::test]
    async fn promotes_user_to_admin() {
        let state = get_state();

        let response = edit_user_endpoint(
            State(state.clone()),
            HxRequest(false),
            Path(UserID::new(2)),
            Ok(Form(form("Robert", "admin"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            parse_json(response).await,
            json!({"id": 2, "email": "bob@example.com", "name": "Robert", "role": "admin"})
        );
        let user = get_user_by_id(UserID::new(2), &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn htmx_edit_redirects_to_users_page() {
        let response = edit_user_endpoint(
            State(get_state()),
            HxRequest(true),
            Path(UserID::new(2)),
            Ok(Form(form("Bob", "user"))),
        )
        .await;

        assert_hx_redirect(&response, endpoints::USERS_VIEW);
    }

    #[tokio::test]
    async fn last_admin_cannot_be_demoted() {
        let state = get_state();

        let response = edit_user_endpoint(
            State(state.clone()),
            HxRequest(false),
            Path(UserID::new(1)),
            Ok(Form(form("Ann", "user"))),
        )
        .await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_body").await;
        let user = get_user_by_id(UserID::new(1), &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let response = edit_user_endpoint(
            State(get_state()),
            HxRequest(false),
            Path(UserID::new(42)),
            Ok(Form(form("Nobody", "user"))),
        )
        .await;

        assert_json_error(response, StatusCode::NOT_FOUND, "not_found").await;
    }

    #[tokio::test]
    async fn empty_name_is_invalid_body() {
        let response = edit_user_endpoint(
            State(get_state()),
            HxRequest(false),
            Path(UserID::new(2)),
            Ok(Form(form("   ", "user"))),
        )
        .await;

        assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_body").await;
    }
}
