//! Builds the log-in URL that sends users back to where they were after logging in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only relative paths are followed after logging in, and never back to the log-in page.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW && !path.starts_with("/api")
}

/// Reduce `raw_url` to a safe path and query, or `None` if it points elsewhere.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    path_and_query_if_safe(&uri)
}

fn path_and_query_if_safe(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL for a request that was refused for lack of a session.
///
/// Page requests come back to the requested page. HTMX requests to the API
/// come back to the page they were sent from. Everything else comes back to
/// the transactions page.
pub fn log_in_url_for(request: &Request) -> String {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_url(request)
    } else {
        path_and_query_if_safe(request.uri())
    };

    log_in_url_with_target(target.as_deref().unwrap_or(endpoints::TRANSACTIONS_VIEW))
}

/// The log-in URL that redirects to `redirect_target` after logging in.
pub fn log_in_url_with_target(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn hx_current_url(request: &Request) -> Option<String> {
    let current_url = request
        .headers()
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so only its path and query are kept.
    let redirect_url = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| path_and_query_if_safe(&uri));

    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
