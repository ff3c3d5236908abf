pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::auth_middleware;
pub use cors::create_cors_layer;
pub use logging::{create_logging_layer, init_logging, request_logging_middleware};
pub use rate_limit::{ip_rate_limit_middleware, IpRateLimiter};
pub use security::security_headers_middleware;
