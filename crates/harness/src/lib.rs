use crate::config::{CredentialSource, RuntimeConfig};
use anyhow::{Context, Result};
use harness_lib::{
    client::near::NearClient,
    wallet::{Credential, credential_from_seed_phrase, load_credential_from_file},
};
use std::sync::Arc;

pub mod config;
pub mod logging;
pub mod runners;
pub mod shutdown;

/// Process context built once in `main` and shared by the runners.
pub struct App {
    config: RuntimeConfig,
    ledger: Arc<NearClient>,
    credential: Arc<Credential>,
}

impl App {
    pub fn init_from(cfg: RuntimeConfig) -> Result<Self> {
        let credential = Arc::new(match &cfg.credential {
            CredentialSource::SeedPhrase(phrase) => credential_from_seed_phrase(phrase)?,
            CredentialSource::File(path) => load_credential_from_file(path)?,
        });
        let ledger = NearClient::connect(&cfg.near_rpc_url, cfg.rpc_timeout_ms, credential.clone())
            .with_context(|| format!("Failed to build RPC client for {}", cfg.near_rpc_url))?;
        let ledger = Arc::new(ledger);

        Ok(Self {
            config: cfg,
            ledger,
            credential,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn ledger(&self) -> Arc<NearClient> {
        self.ledger.clone()
    }

    /// The credential's public key in `ed25519:<base58>` form.
    pub fn public_key(&self) -> String {
        self.credential.public_key().to_string()
    }
}
