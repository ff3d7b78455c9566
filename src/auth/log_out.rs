//! Log-out route handler that ends the session and redirects users to the log-in page.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        cookie::{get_session_token, invalidate_session_cookie},
        middleware::AuthState,
        session::delete_session,
    },
    endpoints,
};

/// Delete the session, invalidate its cookie and redirect the client to the log-in page.
///
/// Logging out without a session just clears the cookie.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    if let Some(token) = get_session_token(&jar) {
        let deleted = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .ok()
            .map(|connection| delete_session(&token, &connection));

        match deleted {
            Some(Ok(())) => tracing::debug!("Ended session {token}"),
            Some(Err(error)) => tracing::error!("Could not delete session {token}: {error}"),
            None => {}
        }
    }

    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
