use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::{self, Next},
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{auth_middleware, AuthService};
use crate::links::LinkService;
use crate::storage::Storage;

use super::analytics::get_link_analytics;
use super::handlers::{create_link, delete_link, health_check, list_links, AppState};

pub fn create_api_router(
    storage: Arc<dyn Storage>,
    auth_service: Arc<AuthService>,
    short_code_max_length: usize,
) -> Router {
    let state = Arc::new(AppState {
        links: LinkService::new(storage, short_code_max_length),
    });

    let protected_routes = Router::new()
        .route("/links", get(list_links).post(create_link))
        .route("/links/{id}", delete(delete_link))
        .route("/links/{id}/analytics", get(get_link_analytics))
        .route_layer(middleware::from_fn(move |headers: HeaderMap, req: Request, next: Next| {
            let auth = Arc::clone(&auth_service);
            auth_middleware(auth, headers, req, next)
        }))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
