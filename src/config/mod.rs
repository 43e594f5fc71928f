use anyhow::{bail, Context};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub redirect_server: ServerConfig,
    pub auth: AuthConfig,
    pub redirect_status: RedirectMode,
    pub short_code_max_length: usize,
    pub client_ip: ClientIpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    None,
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Owner id every request acts as when `mode` is `None`
    pub default_owner: String,
    #[serde(default)]
    pub jwt: Option<JwtConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "JwtConfig::default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl JwtConfig {
    pub const fn default_token_ttl_hours() -> u64 {
        24
    }
}

/// HTTP status used for successful redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RedirectMode {
    MovedPermanently,
    #[default]
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectMode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            301 => Some(Self::MovedPermanently),
            302 => Some(Self::Found),
            307 => Some(Self::TemporaryRedirect),
            308 => Some(Self::PermanentRedirect),
            _ => None,
        }
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            Self::Found => StatusCode::FOUND,
            Self::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            Self::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

/// Which headers may be trusted to carry the visitor's address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Only the socket peer address is used
    #[default]
    None,
    /// `Forwarded` / `X-Forwarded-For` / `X-Real-IP`
    Standard,
    /// `CF-Connecting-IP`
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientIpConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Number of proxies appending to `X-Forwarded-For` in front of the service
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
}

impl Config {
    pub const DEFAULT_SHORT_CODE_MAX_LENGTH: usize = 64;

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./linklens.db?mode=rwc".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
            .unwrap_or(10);

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let redirect_host =
            std::env::var("REDIRECT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let redirect_port = std::env::var("REDIRECT_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("REDIRECT_PORT must be a valid port number")?;

        let auth_mode = match std::env::var("AUTH_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => AuthMode::None,
            "jwt" => AuthMode::Jwt,
            other => {
                tracing::warn!(
                    "Unknown AUTH_MODE '{other}', falling back to 'none'. Supported values: none, jwt"
                );
                AuthMode::None
            }
        };

        let default_owner =
            std::env::var("AUTH_DEFAULT_OWNER").unwrap_or_else(|_| "local".to_string());

        let jwt = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => {
                let token_ttl_hours = std::env::var("JWT_TOKEN_TTL_HOURS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or_else(JwtConfig::default_token_ttl_hours);
                Some(JwtConfig {
                    secret,
                    token_ttl_hours,
                })
            }
            _ => None,
        };

        if auth_mode == AuthMode::Jwt && jwt.is_none() {
            bail!("JWT_SECRET must be set when AUTH_MODE=jwt");
        }

        let redirect_status = match std::env::var("REDIRECT_STATUS") {
            Ok(raw) => {
                let code = raw
                    .trim()
                    .parse::<u16>()
                    .context("REDIRECT_STATUS must be a numeric HTTP status")?;
                RedirectMode::from_code(code).with_context(|| {
                    format!("REDIRECT_STATUS {code} is not supported (use 301, 302, 307 or 308)")
                })?
            }
            Err(_) => RedirectMode::default(),
        };

        let short_code_max_length = std::env::var("SHORT_CODE_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|len| *len > 0)
            .unwrap_or(Self::DEFAULT_SHORT_CODE_MAX_LENGTH);

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            _ => TrustedProxyMode::None,
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            redirect_server: ServerConfig {
                host: redirect_host,
                port: redirect_port,
            },
            auth: AuthConfig {
                mode: auth_mode,
                default_owner,
                jwt,
            },
            redirect_status,
            short_code_max_length,
            client_ip: ClientIpConfig {
                trusted_proxy_mode,
                num_trusted_proxies,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_mode_maps_supported_codes() {
        assert_eq!(RedirectMode::from_code(301), Some(RedirectMode::MovedPermanently));
        assert_eq!(RedirectMode::from_code(302), Some(RedirectMode::Found));
        assert_eq!(RedirectMode::from_code(307), Some(RedirectMode::TemporaryRedirect));
        assert_eq!(RedirectMode::from_code(308), Some(RedirectMode::PermanentRedirect));
        assert_eq!(RedirectMode::from_code(303), None);
        assert_eq!(RedirectMode::from_code(200), None);
    }

    #[test]
    fn default_redirect_mode_is_found() {
        assert_eq!(RedirectMode::default().status_code(), StatusCode::FOUND);
    }
}
