//! Role-based access control.
//!
//! Every protected page and API route asks the gate whether the request's
//! session may proceed. The gate looks up the session referenced by the
//! private session cookie, then reads the user's current role from the user
//! table. The role is never trusted from the cookie, so a demoted user loses
//! access on their next request.

use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{
        cookie::get_session_token,
        session::{self, Session, SessionToken},
    },
    user::{Role, UserID, get_user_role},
};

/// Routes that only administrators may use.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Routes that any logged in user may use.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

/// Who is making a request, as established by the gate.
///
/// Protected route handlers receive this with `Extension(identity): Extension<Identity>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The logged in user.
    pub user_id: UserID,
    /// The user's role at the time of the request.
    pub role: Role,
}

/// Why the gate refused a request.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GateError {
    /// The session cookie is missing, unreadable, unknown or expired.
    #[error("no valid session")]
    Unauthenticated,
    /// The user's role is not allowed to use the route.
    #[error("role not allowed")]
    Forbidden,
    /// The session or role could not be read.
    #[error("could not check access: {0}")]
    Store(Error),
}

/// Looks up sessions by token.
pub trait SessionStore {
    /// Get the session for `token`, or `None` if there is no such session.
    fn get_session(&self, token: &SessionToken) -> Result<Option<Session>, Error>;
}

/// Looks up the current role of a user.
pub trait RoleStore {
    /// Get the role of `user_id`, or `None` if the user does not exist.
    fn find_role_by_user_id(&self, user_id: UserID) -> Result<Option<Role>, Error>;
}

impl SessionStore for Connection {
    fn get_session(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        match session::get_session(token, self) {
            Ok(session) => Ok(Some(session)),
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl RoleStore for Connection {
    fn find_role_by_user_id(&self, user_id: UserID) -> Result<Option<Role>, Error> {
        match get_user_role(user_id, self) {
            Ok(role) => Ok(Some(role)),
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Get the live session referenced by the session cookie in `jar`.
///
/// # Errors
///
/// Returns [GateError::Unauthenticated] if the cookie is missing or the
/// session does not exist or has expired at `now`.
pub fn resolve_session(
    jar: &PrivateCookieJar,
    sessions: &impl SessionStore,
    now: OffsetDateTime,
) -> Result<Session, GateError> {
    let token = get_session_token(jar).ok_or(GateError::Unauthenticated)?;

    match sessions.get_session(&token).map_err(GateError::Store)? {
        Some(session) if !session.is_expired(now) => Ok(session),
        Some(_) => {
            tracing::debug!("Rejected expired session {token}");
            Err(GateError::Unauthenticated)
        }
        None => Err(GateError::Unauthenticated),
    }
}

/// Check that the request's session belongs to a user whose role is in `allowed`.
///
/// # Errors
///
/// Returns [GateError::Unauthenticated] if there is no live session or its
/// user no longer exists, and [GateError::Forbidden] if the user's role is not
/// in `allowed`.
pub fn require_role(
    jar: &PrivateCookieJar,
    allowed: &[Role],
    sessions: &impl SessionStore,
    roles: &impl RoleStore,
    now: OffsetDateTime,
) -> Result<Identity, GateError> {
    let session = resolve_session(jar, sessions, now)?;

    let role = roles
        .find_role_by_user_id(session.user_id)
        .map_err(GateError::Store)?
        .ok_or(GateError::Unauthenticated)?;

    if !allowed.contains(&role) {
        tracing::debug!(
            "User {} with role {role} was refused access",
            session.user_id
        );
        return Err(GateError::Forbidden);
    }

    Ok(Identity {
        user_id: session.user_id,
        role,
    })
}
