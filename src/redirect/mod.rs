pub mod handlers;
pub mod middleware;
pub mod resolver;
pub mod routes;

pub use resolver::{RedirectResolver, RequestContext};
pub use routes::create_redirect_router;
