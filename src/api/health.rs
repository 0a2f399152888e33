//! Health check endpoint

/// Liveness probe. Does not touch the book store.
#[utoipa::path(
    get,
    path = "/api/books/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}
