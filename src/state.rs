//! Shared application state.

use crate::config::Config;
use crate::signature::SignatureVerifier;
use crate::store::MessageStore;

#[derive(Clone)]
pub struct AppState {
    pub store: MessageStore,
    pub verifier: SignatureVerifier,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = MessageStore::connect(&config.database_url)
            .await
            .map_err(|e| anyhow::anyhow!("failed to open message store: {}", e))?;
        let verifier = SignatureVerifier::new(config.webhook_secret.clone());

        Ok(Self {
            store,
            verifier,
            config,
        })
    }

    /// Build state around an existing store, with the given secret.
    /// Integration tests use this with in-memory pools.
    pub fn with_store(store: MessageStore, secret: &str) -> Self {
        let config = Config {
            webhook_secret: secret.to_string(),
            database_url: String::new(),
            port: 0,
        };
        Self {
            store,
            verifier: SignatureVerifier::new(secret),
            config,
        }
    }
}
