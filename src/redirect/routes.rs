use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::config::{ClientIpConfig, RedirectMode};
use crate::storage::Storage;

use super::handlers::{health_check, redirect_url, RedirectState};
use super::middleware::record_request_start;
use super::resolver::RedirectResolver;

pub fn create_redirect_router(
    storage: Arc<dyn Storage>,
    client_ip: ClientIpConfig,
    redirect_status: RedirectMode,
) -> Router {
    let state = Arc::new(RedirectState {
        resolver: RedirectResolver::new(storage),
        client_ip,
        redirect_status,
    });

    Router::new()
        .route("/", get(health_check))
        .route("/{code}", get(redirect_url))
        .layer(middleware::from_fn(record_request_start))
        .with_state(state)
}
