use axum::{http::StatusCode, response::IntoResponse};

/// Returns HTTP status code OK (200) with an empty body so load balancers
/// can check the service without touching the email provider.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
