//! Client IP extraction
//!
//! The socket peer address is used unless the deployment declares that it
//! sits behind a proxy, in which case the forwarding headers are honoured.

use axum::http::HeaderMap;
use std::net::IpAddr;
use tracing::warn;

use crate::config::{ClientIpConfig, TrustedProxyMode};

/// Extract the visitor's IP address according to the trust configuration
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: IpAddr, config: &ClientIpConfig) -> IpAddr {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => extract_standard_ip(headers, config).unwrap_or(socket_addr),
        TrustedProxyMode::None => socket_addr,
    }
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    parse_header_ip(headers, "cf-connecting-ip")
}

/// `Forwarded`, then `X-Forwarded-For`, then `X-Real-IP`
fn extract_standard_ip(headers: &HeaderMap, config: &ClientIpConfig) -> Option<IpAddr> {
    extract_from_forwarded(headers)
        .or_else(|| extract_from_x_forwarded_for(headers, config))
        .or_else(|| parse_header_ip(headers, "x-real-ip"))
}

fn parse_header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// RFC 7239: `Forwarded: for=192.0.2.60;proto=http;by=203.0.113.43`
fn extract_from_forwarded(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers.get("forwarded")?.to_str().ok()?;

    forwarded
        .split(',')
        .flat_map(|element| element.split(';'))
        .filter_map(|param| {
            let param = param.trim();
            let value = param
                .strip_prefix("for=")
                .or_else(|| param.strip_prefix("For="))?;
            parse_forwarded_node(value.trim_matches('"'))
        })
        .next()
}

/// Node forms: `192.0.2.60`, `192.0.2.60:4711`, `[2001:db8::1]`, `[2001:db8::1]:4711`
fn parse_forwarded_node(node: &str) -> Option<IpAddr> {
    if let Some(rest) = node.strip_prefix('[') {
        return rest.split(']').next()?.parse().ok();
    }
    if let Ok(ip) = node.parse::<IpAddr>() {
        return Some(ip);
    }
    node.split(':').next()?.parse().ok()
}

/// With `num_trusted_proxies = n`, the client is the (n+1)-th entry from the
/// right. Without it the leftmost entry is taken.
fn extract_from_x_forwarded_for(headers: &HeaderMap, config: &ClientIpConfig) -> Option<IpAddr> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;

    let ips: Vec<IpAddr> = xff
        .split(',')
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect();

    match config.num_trusted_proxies {
        Some(num_trusted) if ips.len() > num_trusted => Some(ips[ips.len() - num_trusted - 1]),
        _ => ips.first().copied(),
    }
}
