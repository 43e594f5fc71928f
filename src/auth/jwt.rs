use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id of the caller
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 bearer tokens signed with a shared secret
#[derive(Clone)]
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtAuthenticator {
    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        if config.secret.trim().is_empty() {
            bail!("JWT secret must not be empty");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            token_ttl: Duration::hours(config.token_ttl_hours as i64),
        })
    }

    /// Sign a token for `owner_id` valid for the configured lifetime
    pub fn issue(&self, owner_id: &str) -> Result<String> {
        self.issue_with_ttl(owner_id, self.token_ttl)
    }

    pub fn issue_with_ttl(&self, owner_id: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: owner_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign token")
    }

    /// Verify signature and expiry and return the owner id
    pub fn validate(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("token failed signature or expiry validation")?;

        let owner_id = data.claims.sub.trim();
        if owner_id.is_empty() {
            bail!("token has an empty 'sub' claim");
        }

        Ok(owner_id.to_string())
    }
}
