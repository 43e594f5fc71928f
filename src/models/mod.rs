mod click;
mod link;

pub use click::{ClickEvent, NewClickEvent, DIRECT_REFERRER, UNKNOWN_COUNTRY};
pub use link::{parse_expiration, CreateLinkRequest, Link, NewLink};
