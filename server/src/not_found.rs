//! 404 responses: a hand-authored `404.html` at the serving root wins,
//! browsers get a styled page, everything else a plain text line.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::AppState;

/// Name of the optional 404 override at the serving root.
const OVERRIDE_NAME: &str = "404.html";

const STYLED_PAGE: &str = include_str!("not_found.html");

pub(crate) async fn response(state: &AppState, raw_path: &str, wants_html: bool) -> Response {
    if let Ok(bytes) = tokio::fs::read(state.root.join(OVERRIDE_NAME)).await {
        return html_404(Body::from(bytes));
    }
    if wants_html {
        let page = STYLED_PAGE
            .replace("%path%", &escape_html(raw_path))
            .replace("%version%", &autoindex_core::version());
        return html_404(Body::from(page));
    }
    (StatusCode::NOT_FOUND, format!("404 - Not Found\n{}\n", autoindex_core::version()))
        .into_response()
}

fn html_404(body: Body) -> Response {
    let response = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(body);
    match response {
        Ok(response) => response,
        Err(e) => {
            error!("cannot assemble 404 response: {e}");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
