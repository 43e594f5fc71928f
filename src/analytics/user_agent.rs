//! User-agent classification
//!
//! Turns a raw `User-Agent` header into the browser / OS / device labels
//! stored on every click. Never returns an empty label: anything woothee
//! cannot identify falls back to `"Unknown"`, and devices without a
//! handheld signal are assumed to be `"Desktop"`.

use serde::{Deserialize, Serialize};
use woothee::parser::{Parser, WootheeResult};

pub const UNKNOWN: &str = "Unknown";
pub const DESKTOP: &str = "Desktop";
pub const MOBILE: &str = "mobile";
pub const TABLET: &str = "tablet";

/// woothee's marker for fields it could not determine
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
}

impl ClientInfo {
    fn unknown() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
            device: DESKTOP.to_string(),
        }
    }
}

/// Classify a user-agent string. Absent or blank input yields
/// `{Unknown, Unknown, Desktop}`.
pub fn classify(user_agent: Option<&str>) -> ClientInfo {
    let ua = match user_agent.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return ClientInfo::unknown(),
    };

    let parser = Parser::new();
    let Some(result) = parser.parse(ua) else {
        return ClientInfo::unknown();
    };

    ClientInfo {
        browser: known(result.name).unwrap_or(UNKNOWN).to_string(),
        os: known(result.os).unwrap_or(UNKNOWN).to_string(),
        device: device_label(ua, &result),
    }
}

fn known(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == WOOTHEE_UNKNOWN {
        None
    } else {
        Some(value)
    }
}

/// Device type when there is a handheld signal, else `"<vendor> <model>"`
/// for identifiable appliances, else `"Desktop"`.
fn device_label(ua: &str, result: &WootheeResult<'_>) -> String {
    if let Some(kind) = device_type(ua, result) {
        return kind.to_string();
    }

    if result.category == "appliance" {
        if let (Some(vendor), Some(model)) = (known(result.vendor), known(result.os)) {
            return vendor_model(vendor, model);
        }
    }

    DESKTOP.to_string()
}

fn device_type(ua: &str, result: &WootheeResult<'_>) -> Option<&'static str> {
    match result.category {
        "smartphone" | "mobilephone" => {
            if is_tablet(ua, result.os) {
                Some(TABLET)
            } else {
                Some(MOBILE)
            }
        }
        _ => None,
    }
}

fn is_tablet(ua: &str, os: &str) -> bool {
    // Android phones advertise "Mobile"; Android tablets omit it
    os == "iPad" || ua.contains("Tablet") || (os == "Android" && !ua.contains("Mobile"))
}

fn vendor_model(vendor: &str, model: &str) -> String {
    if model.starts_with(vendor) {
        model.to_string()
    } else {
        format!("{vendor} {model}")
    }
}
