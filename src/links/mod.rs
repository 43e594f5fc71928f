pub mod service;
pub mod short_code;

pub use service::LinkService;
pub use short_code::generate_short_code;
