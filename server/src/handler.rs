//! Request resolution: static files, generated listings, redirects, 404s.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::AppState;
use crate::not_found;

/// What a request path resolved to.
enum Resolution {
    /// An existing file to send back.
    File(PathBuf),
    /// A rendered listing page.
    Page(String),
    /// Directory hit without a trailing slash.
    Redirect,
    /// Nothing to serve there.
    Missing,
    /// Listing generation failed.
    Failed,
}

pub(crate) async fn handle(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let raw_path = request.uri().path().to_owned();
    let wants_html = accepts_html(&request);

    let resolved = match sanitize_request_path(&raw_path) {
        Some(relative) => {
            let state = Arc::clone(&state);
            let raw = raw_path.clone();
            match tokio::task::spawn_blocking(move || resolve(&state, &relative, &raw)).await {
                Ok(resolution) => resolution,
                Err(e) => {
                    error!("resolver task failed: {e}");
                    Resolution::Failed
                }
            }
        }
        None => Resolution::Missing,
    };

    match resolved {
        Resolution::File(path) => match serve_file(&path).await {
            Some(response) => response,
            None => not_found::response(&state, &raw_path, wants_html).await,
        },
        Resolution::Page(html) => listing_response(html),
        Resolution::Redirect => redirect_response(&slash_form(request.uri())),
        Resolution::Missing => not_found::response(&state, &raw_path, wants_html).await,
        Resolution::Failed => server_error_response(),
    }
}

/// Walk the sanitized path onto the filesystem. Runs on the blocking pool
/// because every branch does synchronous filesystem work.
fn resolve(state: &AppState, relative: &Path, raw_path: &str) -> Resolution {
    let target = state.root.join(relative);
    let cache = state.builder.cache();
    let Ok(meta) = cache.stat(&target) else {
        return Resolution::Missing;
    };

    if meta.is_file() {
        return Resolution::File(target);
    }

    // Canonical listing URLs end in a slash.
    if !raw_path.ends_with('/') {
        return Resolution::Redirect;
    }

    let on_disk_index = target.join("index.html");
    if cache.stat(&on_disk_index).is_ok_and(|meta| meta.is_file()) {
        return Resolution::File(on_disk_index);
    }

    if let Some(page) = state.pages.lock().get(&target) {
        return Resolution::Page(page.clone());
    }

    match state.builder.build(&target, &state.root) {
        Ok(Some(page)) => {
            state.pages.lock().insert(target, page.clone());
            Resolution::Page(page)
        }
        // The directory carries a manual index the builder refuses to
        // replace, and no index.html exists on disk.
        Ok(None) => Resolution::Missing,
        Err(e) => {
            error!("failed to build listing for {}: {e}", target.display());
            Resolution::Failed
        }
    }
}

async fn serve_file(path: &Path) -> Option<Response> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("cannot read {}: {e}", path.display());
            return None;
        }
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(bytes));
    match response {
        Ok(response) => Some(response),
        Err(e) => {
            error!("cannot assemble response for {}: {e}", path.display());
            None
        }
    }
}

fn listing_response(html: String) -> Response {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
}

fn redirect_response(location: &str) -> Response {
    let response = Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .body(Body::empty());
    match response {
        Ok(response) => response,
        Err(e) => {
            error!("cannot assemble redirect to {location}: {e}");
            server_error_response()
        }
    }
}

fn server_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "500 - Internal Server Error\n").into_response()
}

/// The slash-terminated form of a request URI, query string intact.
fn slash_form(uri: &Uri) -> String {
    match uri.query() {
        Some(query) => format!("{}/?{query}", uri.path()),
        None => format!("{}/", uri.path()),
    }
}

/// Decode and normalize a request path into a path relative to the root.
/// Rejects anything that could escape it.
fn sanitize_request_path(raw: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(raw).ok()?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }
    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment => relative.push(segment),
        }
    }
    Some(relative)
}

/// Whether the client advertised it can render HTML. Requests without an
/// `Accept` header get the plain fallback.
fn accepts_html(request: &Request) -> bool {
    let Some(accept) = request.headers().get(header::ACCEPT) else {
        return false;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };
    accept.contains("text/html")
        || accept.contains("application/xhtml+xml")
        || accept.contains("*/*")
}
