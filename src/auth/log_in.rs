//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! Sessions and cookies are handled by the lower level `session` and `cookie` modules.

use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::{HxRedirect, HxRequest};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    api_error::ApiError,
    auth::{
        cookie::set_session_cookie,
        gate::Identity,
        middleware::AuthState,
        redirect::normalize_redirect_url,
        session::{Session, create_session},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, email_input, loading_spinner, log_in_register,
        password_input,
    },
    user::{Email, User, get_user_by_email},
};

/// How long the session should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Setting up a new Tallybook? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Create the first account"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to keep the session alive for [REMEMBER_ME_DURATION].
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

/// Check the credentials and start a session.
fn log_in(
    state: &AuthState,
    user_data: &LogInData,
    now: OffsetDateTime,
) -> Result<(User, Session), Error> {
    let email = Email::new(&user_data.email).map_err(|_| Error::InvalidCredentials)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = match get_user_by_email(&email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&user_data.password)? {
        return Err(Error::InvalidCredentials);
    }

    let session_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_DURATION
    } else {
        state.session_duration
    };

    let session = create_session(user.id, session_duration, now, &connection)?;

    Ok((user, session))
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, a session is started, its cookie is set and
/// HTMX clients are redirected to the requested page, or the transactions page.
/// Other clients receive the new identity as JSON.
///
/// Otherwise, HTMX clients get the form back with an error message and other
/// clients get an `unauthorized` error.
pub async fn post_log_in(
    State(state): State<AuthState>,
    HxRequest(is_htmx): HxRequest,
    jar: PrivateCookieJar,
    user_data: Result<Form<LogInData>, FormRejection>,
) -> Response {
    let Form(user_data) = match user_data {
        Ok(form) => form,
        Err(rejection) => return ApiError::from(rejection).into_response_for(is_htmx),
    };

    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    match log_in(&state, &user_data, OffsetDateTime::now_utc()) {
        Ok((user, session)) => {
            tracing::info!("User {} logged in", user.id);
            let jar = set_session_cookie(jar, &session);

            if is_htmx {
                let redirect_url = redirect_url.unwrap_or(endpoints::TRANSACTIONS_VIEW);
                (
                    StatusCode::SEE_OTHER,
                    HxRedirect(redirect_url.to_owned()),
                    jar,
                )
                    .into_response()
            } else {
                let identity = Identity {
                    user_id: user.id,
                    role: user.role,
                };
                (jar, Json(identity)).into_response()
            }
        }
        Err(Error::InvalidCredentials) if is_htmx => log_in_form(
            &user_data.email,
            Some(INVALID_CREDENTIALS_ERROR_MSG),
            redirect_url,
        )
        .into_response(),
        Err(error) if is_htmx => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url).into_response()
        }
        Err(error) => ApiError::from(error).into_response(),
    }
}
