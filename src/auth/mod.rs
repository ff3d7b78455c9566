//! Sessions, the access gate and the log-in, log-out and registration pages.

use time::Duration;

mod cookie;
mod gate;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;
mod session;
mod session_endpoint;

/// How long a session lasts after the user's last request.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::minutes(30);

pub use gate::{ADMIN_ONLY, ANY_ROLE, GateError, Identity};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, GuardState, api_guard, page_guard};
pub use register::{get_register_page, register_user};
pub use session::{create_session_table, delete_expired_sessions};
pub use session_endpoint::get_session_identity;
