//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    api_error::method_not_allowed,
    auth::{
        ADMIN_ONLY, ANY_ROLE, AuthState, GuardState, api_guard, get_log_in_page, get_log_out,
        get_register_page, get_session_identity, page_guard, post_log_in, register_user,
    },
    endpoints,
    forbidden::get_forbidden_page,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{export_transactions_endpoint, get_reports_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transactions_page, list_transactions_endpoint,
    },
    user::{
        create_user_endpoint, delete_user_endpoint, edit_user_endpoint, get_users_page,
        list_users_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Pages redirect to the log-in or forbidden page when the access gate
/// refuses a request, API routes answer with a 401 or 403 error instead.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    let any_role_page = middleware::from_fn_with_state(
        GuardState::new(auth_state.clone(), ANY_ROLE),
        page_guard,
    );
    let admin_page = middleware::from_fn_with_state(
        GuardState::new(auth_state.clone(), ADMIN_ONLY),
        page_guard,
    );
    let any_role_api = middleware::from_fn_with_state(
        GuardState::new(auth_state.clone(), ANY_ROLE),
        api_guard,
    );
    let admin_api =
        middleware::from_fn_with_state(GuardState::new(auth_state, ADMIN_ONLY), api_guard);

    let page_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_VIEW,
            get(get_transactions_page).route_layer(any_role_page.clone()),
        )
        .route(
            endpoints::REPORTS_VIEW,
            get(get_reports_page).route_layer(any_role_page),
        )
        .route(
            endpoints::USERS_VIEW,
            get(get_users_page).route_layer(admin_page),
        );

    // Reading transactions is open to every role, writing them is not, so the
    // methods of one path can sit behind different guards.
    let api_routes = Router::new()
        .route(
            endpoints::SESSION_API,
            get(get_session_identity).route_layer(any_role_api.clone()),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint)
                .route_layer(any_role_api.clone())
                .merge(post(create_transaction_endpoint).route_layer(admin_api.clone())),
        )
        .route(
            endpoints::TRANSACTION_API,
            put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint)
                .route_layer(admin_api.clone()),
        )
        .route(
            endpoints::REPORT_EXPORT_API,
            get(export_transactions_endpoint).route_layer(any_role_api),
        )
        .route(
            endpoints::USERS_API,
            get(list_users_endpoint)
                .post(create_user_endpoint)
                .route_layer(admin_api.clone()),
        )
        .route(
            endpoints::USER_API,
            put(edit_user_endpoint)
                .delete(delete_user_endpoint)
                .route_layer(admin_api),
        );

    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::REGISTER_API, post(register_user))
        .route(endpoints::FORBIDDEN_VIEW, get(get_forbidden_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    page_routes
        .merge(api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}
