//! Analytics API handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use super::handlers::AppState;
use crate::analytics::AnalyticsReport;
use crate::auth::Identity;
use crate::error::ServiceResult;

/// Click analytics for one of the caller's links
pub async fn get_link_analytics(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<AnalyticsReport>> {
    let report = state.links.report(&identity.owner_id, id).await?;
    Ok(Json(report))
}
