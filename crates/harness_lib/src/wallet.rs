use anyhow::{Context, Result, anyhow, bail};
use bip39::{Language, Mnemonic};
use ed25519_dalek::SigningKey;
use near_crypto::{ED25519SecretKey, InMemorySigner, KeyFile, PublicKey, SecretKey};
use near_primitives::types::AccountId;
use std::path::Path;

/// NEAR's registered BIP-44 coin path, as used by wallet seed phrases.
pub const NEAR_DERIVATION_PATH: [u32; 3] = [44, 397, 0];

/// The process signing key. Loaded once and shared read-only.
pub struct Credential {
    secret_key: SecretKey,
}

impl Credential {
    pub fn new(secret_key: SecretKey) -> Self {
        Self { secret_key }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public_key()
    }

    /// A signer acting for `account_id` with this key.
    pub fn signer(&self, account_id: AccountId) -> InMemorySigner {
        InMemorySigner::from_secret_key(account_id, self.secret_key.clone())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("public_key", &self.public_key().to_string())
            .finish_non_exhaustive()
    }
}

/// Derive the key from a BIP-39 phrase with SLIP-10 ed25519 along m/44'/397'/0'.
pub fn credential_from_seed_phrase(phrase: &str) -> Result<Credential> {
    let mnemonic = Mnemonic::parse_in(Language::English, phrase.trim())
        .map_err(|e| anyhow!("Invalid seed phrase: {}", e))?;
    let seed = mnemonic.to_seed("");
    let secret = slip10_ed25519::derive_ed25519_private_key(&seed, &NEAR_DERIVATION_PATH);
    let keypair = SigningKey::from_bytes(&secret).to_keypair_bytes();
    Ok(Credential::new(SecretKey::ED25519(ED25519SecretKey(keypair))))
}

/// Load a credentials file (`~/.near-credentials/<network>/<account>.json` layout).
pub fn load_credential_from_file(path: &str) -> Result<Credential> {
    let key_file = KeyFile::from_file(Path::new(path))
        .with_context(|| format!("Failed to read credentials file: {}", path))?;
    if key_file.secret_key.public_key() != key_file.public_key {
        bail!(
            "Credentials file {} has a public key that does not match its secret key",
            path
        );
    }
    Ok(Credential::new(key_file.secret_key))
}
