//! User accounts, roles and passwords, and the pages and endpoints for managing them.

mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod edit_endpoint;
mod list_endpoint;
mod password;
mod users_page;

pub use create_endpoint::create_user_endpoint;
pub use db::{
    count_users, create_user, create_user_table, delete_user, get_all_users, get_user_by_email,
    get_user_role, update_password, update_user,
};
pub use delete_endpoint::delete_user_endpoint;
pub use domain::{
    EditUserForm, Email, NewUser, NewUserForm, Role, User, UserID, UserName, UserResponse,
};
pub use edit_endpoint::edit_user_endpoint;
pub use list_endpoint::list_users_endpoint;
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use users_page::get_users_page;
