use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use super::middleware::RequestStart;
use super::resolver::{RedirectResolver, RequestContext};
use crate::analytics::extract_client_ip;
use crate::config::{ClientIpConfig, RedirectMode};
use crate::error::ServiceError;

pub struct RedirectState {
    pub resolver: RedirectResolver,
    pub client_ip: ClientIpConfig,
    pub redirect_status: RedirectMode,
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    Extension(RequestStart(request_start)): Extension<RequestStart>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let context = RequestContext {
        user_agent: header_string(&headers, header::USER_AGENT.as_str()),
        ip_address: Some(extract_client_ip(&headers, addr.ip(), &state.client_ip).to_string()),
        referrer: header_string(&headers, header::REFERER.as_str()),
    };

    let target = match state.resolver.resolve(&code, &context).await {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    let location = match HeaderValue::from_str(&target) {
        Ok(value) => value,
        Err(e) => {
            return ServiceError::Storage(anyhow::anyhow!(
                "stored URL for '{code}' is not a valid Location header: {e}"
            ))
            .into_response();
        }
    };

    tracing::debug!(
        short_code = %code,
        elapsed_ms = request_start.elapsed().as_millis() as u64,
        "redirect resolved"
    );

    (
        state.redirect_status.status_code(),
        [(header::LOCATION, location)],
    )
        .into_response()
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
