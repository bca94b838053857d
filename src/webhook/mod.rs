pub mod handlers;
pub mod routes;

pub use handlers::{post_webhook, WebhookOutcome};
pub use routes::create_webhook_router;
