use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::{MessageResponse, ServiceResult};
use crate::links::LinkService;
use crate::models::{CreateLinkRequest, Link};

pub struct AppState {
    pub links: LinkService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Create a new short link
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> ServiceResult<Json<Link>> {
    let Json(payload) = payload?;
    let link = state.links.create(&identity.owner_id, payload).await?;
    Ok(Json(link))
}

/// List the caller's links, newest first
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> ServiceResult<Json<Vec<Link>>> {
    let links = state.links.list(&identity.owner_id).await?;
    Ok(Json(links))
}

/// Delete one of the caller's links along with its clicks
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<MessageResponse>> {
    state.links.delete(&identity.owner_id, id).await?;
    Ok(Json(MessageResponse::new("URL removed")))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
