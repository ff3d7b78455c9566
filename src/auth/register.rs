//! The registration page for creating the first account.
//!
//! The first account is an administrator. Once any account exists,
//! registration is closed and new accounts are created from the users page.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{cookie::set_session_cookie, middleware::AuthState, session::create_session},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        email_input, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    user::{
        Email, MIN_PASSWORD_LENGTH, NewUser, PasswordHash, Role, UserName, ValidatedPassword,
        count_users, create_user,
    },
};

const REGISTRATION_CLOSED_MSG: &str =
    "An account already exists. Ask an administrator to create an account for you.";

#[derive(Default)]
struct FormErrors<'a> {
    email: Option<&'a str>,
    name: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn name_input(name: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                type="text"
                name="name"
                id="name"
                placeholder="Your name"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(name);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(MIN_PASSWORD_LENGTH)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(email: &str, name: &str, errors: FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (name_input(name, errors.name))
            (password_input("", MIN_PASSWORD_LENGTH, errors.password))
            (confirm_password_input(errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            (log_in_link())
        }
    }
}

fn log_in_link() -> Markup {
    html! {
        p class="text-sm font-light text-gray-500 dark:text-gray-400"
        {
            "Already have an account? "
            a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE) { "Log in here" }
        }
    }
}

fn registration_closed() -> Markup {
    html! {
        div class="space-y-4"
        {
            p class="text-gray-900 dark:text-white" { (REGISTRATION_CLOSED_MSG) }
            (log_in_link())
        }
    }
}

/// Display the registration page, or a notice if registration is closed.
pub async fn get_register_page(State(state): State<AuthState>) -> Response {
    let user_count = match state.db_connection.lock() {
        Ok(connection) => count_users(&connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let content = match user_count {
        Ok(0) => registration_form("", "", FormErrors::default()),
        Ok(_) => registration_closed(),
        Err(error) => return error.into_response(),
    };

    base(
        "Register",
        &[],
        &log_in_register("Create your account", &content),
    )
    .into_response()
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create the first account as an administrator and log them in.
///
/// Validation errors are shown next to the offending field.
pub async fn register_user(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match Email::new(&user_data.email) {
        Ok(email) => email,
        Err(error) => {
            return registration_form(
                &user_data.email,
                &user_data.name,
                FormErrors {
                    email: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let name = match UserName::new(&user_data.name) {
        Ok(name) => name,
        Err(error) => {
            return registration_form(
                &user_data.email,
                &user_data.name,
                FormErrors {
                    name: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password =
        match ValidatedPassword::new(&user_data.password, &[email.as_ref(), name.as_ref()]) {
            Ok(password) => password,
            Err(error) => {
                return registration_form(
                    &user_data.email,
                    &user_data.name,
                    FormErrors {
                        password: Some(&error.to_string()),
                        ..Default::default()
                    },
                )
                .into_response();
            }
        };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data.email,
            &user_data.name,
            FormErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    // Counted under the same lock as the insert so two first registrations cannot both succeed.
    match count_users(&connection) {
        Ok(0) => {}
        Ok(_) => {
            return registration_form(
                &user_data.email,
                &user_data.name,
                FormErrors {
                    email: Some(REGISTRATION_CLOSED_MSG),
                    ..Default::default()
                },
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("could not count users: {error}");
            return get_internal_server_error_redirect();
        }
    }

    let new_user = NewUser {
        email,
        name,
        role: Role::Admin,
        password_hash,
    };

    let session = create_user(new_user, &connection).and_then(|user| {
        tracing::info!("Registered administrator {}", user.id);
        create_session(
            user.id,
            state.session_duration,
            OffsetDateTime::now_utc(),
            &connection,
        )
    });

    match session {
        Ok(session) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            set_session_cookie(jar, &session),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while registering: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{
        auth::middleware::AuthState,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_document, parse_html_fragment,
        },
        user::{Email, NewUser, PasswordHash, Role, UserName, count_users, create_user,
            get_user_by_email},
    };

    use super::{REGISTRATION_CLOSED_MSG, RegisterForm, get_register_page, register_user};

    fn get_state() -> AuthState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        AuthState {
            cookie_key: Key::from(&Sha512::digest("registration")),
            session_duration: Duration::minutes(30),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn add_existing_user(state: &AuthState) {
        create_user(
            NewUser {
                email: Email::new_unchecked("first@example.com"),
                name: UserName::new_unchecked("First"),
                role: Role::Admin,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    fn form(password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            email: "ann@example.com".to_owned(),
            name: "Ann".to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn register(state: &AuthState, form: RegisterForm) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state.clone()), jar, Form(form)).await
    }

    fn user_count(state: &AuthState) -> usize {
        count_users(&state.db_connection.lock().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn register_page_displays_form() {
        let response = get_register_page(State(get_state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::REGISTER_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
    }

    #[tokio::test]
    async fn register_page_is_closed_once_a_user_exists() {
        let state = get_state();
        add_existing_user(&state);

        let response = get_register_page(State(state)).await;

        let document = parse_html_document(response).await;
        assert_eq!(
            document
                .select(&scraper::Selector::parse("form").unwrap())
                .count(),
            0
        );
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains(REGISTRATION_CLOSED_MSG));
    }

    #[tokio::test]
    async fn first_user_becomes_admin_and_is_logged_in() {
        let state = get_state();

        let response = register(
            &state,
            form("asomewhatlongpassword1", "asomewhatlongpassword1"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        assert!(response.headers().get(SET_COOKIE).is_some());
        let user = get_user_by_email(
            &Email::new_unchecked("ann@example.com"),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.password_hash.verify("asomewhatlongpassword1"), Ok(true));
    }

    #[tokio::test]
    async fn registration_closed_once_a_user_exists() {
        let state = get_state();
        add_existing_user(&state);

        let response = register(
            &state,
            form("asomewhatlongpassword1", "asomewhatlongpassword1"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(user_count(&state), 1);
        let document = parse_html_fragment(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains(REGISTRATION_CLOSED_MSG));
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let state = get_state();

        let response = register(
            &state,
            form("asomewhatlongpassword1", "asomewhatlongpassword2"),
        )
        .await;

        assert_eq!(user_count(&state), 0);
        let document = parse_html_fragment(response).await;
        let error = document
            .select(&scraper::Selector::parse("input#confirm-password + p").unwrap())
            .next()
            .expect("No confirm password error");
        assert_eq!(error.text().collect::<String>(), "Passwords do not match");
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let state = get_state();

        let response = register(&state, form("password1234", "password1234")).await;

        assert_eq!(user_count(&state), 0);
        let document = parse_html_fragment(response).await;
        assert!(
            document
                .select(&scraper::Selector::parse("input#password + p").unwrap())
                .next()
                .is_some(),
            "want an error message under the password input"
        );
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let state = get_state();

        let response = register(
            &state,
            RegisterForm {
                email: "not an email".to_owned(),
                ..form("asomewhatlongpassword1", "asomewhatlongpassword1")
            },
        )
        .await;

        assert_eq!(user_count(&state), 0);
        let document = parse_html_fragment(response).await;
        assert!(
            document
                .select(&scraper::Selector::parse("input#email + p").unwrap())
                .next()
                .is_some()
        );
    }
}
