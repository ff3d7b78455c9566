//! Middleware that runs the access gate in front of protected routes and extends sessions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    api_error::ApiError,
    auth::{
        cookie::{get_session_token, set_session_cookie},
        gate::{GateError, require_role},
        redirect::log_in_url_for,
        session::touch_session,
    },
    endpoints,
    internal_server_error::InternalServerError,
    user::Role,
};

/// The state needed to check sessions.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the last request.
    pub session_duration: Duration,
    /// The database connection holding sessions and users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The state for one guarded group of routes: the gate and the roles it lets through.
#[derive(Debug, Clone)]
pub struct GuardState {
    /// The gate's state.
    pub gate: AuthState,
    /// The roles allowed to use the routes.
    pub allowed: &'static [Role],
}

impl GuardState {
    /// Guard routes with `gate` so that only `allowed` roles get through.
    pub fn new(gate: AuthState, allowed: &'static [Role]) -> Self {
        Self { gate, allowed }
    }
}

/// Check access for `request`, run the handler if allowed and extend the session afterwards.
///
/// `on_refused` builds the response for a refused request.
async fn guard_internal(
    state: GuardState,
    mut request: Request,
    next: Next,
    on_refused: impl FnOnce(GateError, &Request) -> Response,
) -> Response {
    let jar = PrivateCookieJar::from_headers(request.headers(), state.gate.cookie_key.clone());

    let checked = match state.gate.db_connection.lock() {
        Ok(connection) => require_role(
            &jar,
            state.allowed,
            &*connection,
            &*connection,
            OffsetDateTime::now_utc(),
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(GateError::Store(Error::DatabaseLockError))
        }
    };

    let identity = match checked {
        Ok(identity) => identity,
        Err(error) => return on_refused(error, &request),
    };

    request.extensions_mut().insert(identity);
    let response = next.run(request).await;

    extend_session(&state.gate, jar, response)
}

/// Slide the session's expiry forward and re-send the cookie with the new expiry.
fn extend_session(gate: &AuthState, jar: PrivateCookieJar, response: Response) -> Response {
    let Some(token) = get_session_token(&jar) else {
        return response;
    };

    let touched = match gate.db_connection.lock() {
        Ok(connection) => touch_session(
            &token,
            gate.session_duration,
            OffsetDateTime::now_utc(),
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let session = match touched {
        Ok(session) => session,
        // The handler ended the session, e.g. a user deleting their own account.
        Err(Error::NotFound) => return response,
        Err(error) => {
            tracing::error!("Could not extend session {token}: {error}");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    let jar = set_session_cookie(jar, &session);
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

/// Middleware for page routes.
///
/// Requests without a session are redirected to the log-in page, and requests
/// from a role that is not allowed are redirected to the forbidden page.
///
/// **Note**: Route handlers can use the function argument `Extension(identity): Extension<Identity>` to receive the caller's identity.
pub async fn page_guard(State(state): State<GuardState>, request: Request, next: Next) -> Response {
    guard_internal(state, request, next, |error, request| match error {
        GateError::Unauthenticated => Redirect::to(&log_in_url_for(request)).into_response(),
        GateError::Forbidden => Redirect::to(endpoints::FORBIDDEN_VIEW).into_response(),
        GateError::Store(error) => {
            tracing::error!("Could not check access to {}: {error}", request.uri());
            InternalServerError::default().into_response()
        }
    })
    .await
}

/// Middleware for API routes.
///
/// Refused requests get the matching API error. HTMX requests without a
/// session are sent to the log-in page with `HX-Redirect`, and other HTMX
/// errors are shown as an alert.
///
/// **Note**: Route handlers can use the function argument `Extension(identity): Extension<Identity>` to receive the caller's identity.
pub async fn api_guard(State(state): State<GuardState>, request: Request, next: Next) -> Response {
    guard_internal(state, request, next, |error, request| {
        let is_htmx = is_htmx_request(request.headers());

        match error {
            GateError::Unauthenticated if is_htmx => (
                HxRedirect(log_in_url_for(request)),
                StatusCode::UNAUTHORIZED,
            )
                .into_response(),
            error => ApiError::from(error).into_response_for(is_htmx),
        }
    })
    .await
}
