pub mod jwt;

use anyhow::{bail, Result};
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AuthConfig, AuthMode};
use crate::error::MessageResponse;

pub use jwt::{Claims, JwtAuthenticator};

/// The caller as resolved by the auth layer. Handlers only ever see this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let msg = match self {
            Self::MissingToken => "No token, authorization denied",
            Self::InvalidToken => "Token is not valid",
        };
        (StatusCode::UNAUTHORIZED, Json(MessageResponse::new(msg))).into_response()
    }
}

pub struct AuthService {
    mode: AuthMode,
    default_owner: String,
    jwt: Option<JwtAuthenticator>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let jwt = match (&config.mode, &config.jwt) {
            (AuthMode::Jwt, Some(jwt)) => Some(JwtAuthenticator::from_config(jwt)?),
            (AuthMode::Jwt, None) => bail!("JWT settings are required when AUTH_MODE=jwt"),
            (AuthMode::None, _) => None,
        };

        Ok(Self {
            mode: config.mode,
            default_owner: config.default_owner,
            jwt,
        })
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Resolve the caller from request headers
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthRejection> {
        let Some(jwt) = &self.jwt else {
            return Ok(Identity {
                owner_id: self.default_owner.clone(),
            });
        };

        let token = bearer_token(headers).ok_or(AuthRejection::MissingToken)?;

        match jwt.validate(token) {
            Ok(owner_id) => Ok(Identity { owner_id }),
            Err(err) => {
                debug!(error = %err, "rejecting bearer token");
                Err(AuthRejection::InvalidToken)
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject unauthenticated requests; attach the caller's `Identity` otherwise
pub async fn auth_middleware(
    auth_service: Arc<AuthService>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match auth_service.authenticate(&headers) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::HeaderValue;

    fn jwt_service() -> AuthService {
        AuthService::new(AuthConfig {
            mode: AuthMode::Jwt,
            default_owner: "local".into(),
            jwt: Some(JwtConfig {
                secret: "unit-test-secret".into(),
                token_ttl_hours: 1,
            }),
        })
        .unwrap()
    }

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn none_mode_uses_default_owner() {
        let service = AuthService::new(AuthConfig {
            mode: AuthMode::None,
            default_owner: "local".into(),
            jwt: None,
        })
        .unwrap();

        let identity = service.authenticate(&HeaderMap::new()).unwrap();
        assert_eq!(identity.owner_id, "local");
    }

    #[test]
    fn jwt_mode_requires_settings() {
        let result = AuthService::new(AuthConfig {
            mode: AuthMode::Jwt,
            default_owner: "local".into(),
            jwt: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(
            jwt_service().authenticate(&HeaderMap::new()),
            Err(AuthRejection::MissingToken)
        );
    }

    #[test]
    fn non_bearer_scheme_is_treated_as_missing() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(
            jwt_service().authenticate(&headers),
            Err(AuthRejection::MissingToken)
        );
    }

    #[test]
    fn invalid_token_is_rejected() {
        let headers = headers_with_auth("Bearer nope");
        assert_eq!(
            jwt_service().authenticate(&headers),
            Err(AuthRejection::InvalidToken)
        );
    }

    #[test]
    fn valid_token_resolves_owner() {
        let service = jwt_service();
        let token = service.jwt.as_ref().unwrap().issue("alice").unwrap();
        let headers = headers_with_auth(&format!("bearer {token}"));

        let identity = service.authenticate(&headers).unwrap();
        assert_eq!(identity.owner_id, "alice");
    }
}
