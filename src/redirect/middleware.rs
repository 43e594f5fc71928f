use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Instant the redirect server started handling the request
#[derive(Copy, Clone)]
pub struct RequestStart(pub Instant);

/// Stamp the request with its start time and log the outcome once handled
pub async fn record_request_start(mut request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let path = request.uri().path().to_owned();
    request.extensions_mut().insert(RequestStart(started));

    let response = next.run(request).await;

    tracing::debug!(
        path = %path,
        status = response.status().as_u16(),
        total_ms = started.elapsed().as_millis() as u64,
        "redirect request finished"
    );
    response
}
