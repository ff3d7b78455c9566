//! Lets clients ask who they are logged in as.

use axum::{Extension, Json};

use crate::auth::gate::Identity;

/// Return the caller's user ID and role.
///
/// Mounted behind the API guard, which answers 401 when there is no session.
pub async fn get_session_identity(Extension(identity): Extension<Identity>) -> Json<Identity> {
    Json(identity)
}
