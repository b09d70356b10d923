use axum::response::{Html, IntoResponse};
use http::StatusCode;

/// Serves the landing page that carries the contact form.
#[tracing::instrument(name = "Home page")]
pub async fn home() -> impl IntoResponse {
    let body = include_str!("home/home.html");
    (StatusCode::OK, Html(body))
}
