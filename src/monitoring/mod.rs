pub mod endpoints;
pub mod metrics;
pub mod middleware;

pub use endpoints::monitoring_router;
pub use middleware::request_logging_middleware;
