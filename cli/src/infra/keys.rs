//! PEM key loading: implements `ValidatorKeyLoader`.

use std::path::Path;

use anyhow::{Context, Result};
use rustls_pemfile::Item;

use crate::application::ports::ValidatorKeyLoader;
use crate::domain::pem::{KeyFormat, PrivateKey};

/// Reads the first private key from a PEM file. Certificates and other
/// sections in the same file are skipped.
pub struct PemKeyLoader;

impl ValidatorKeyLoader for PemKeyLoader {
    async fn load(&self, path: &Path) -> Result<PrivateKey> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to open validator key: {}", path.display()))?;
        parse_private_key(&content)
            .with_context(|| format!("failed to parse validator key: {}", path.display()))
    }
}

/// First private key in `pem`.
///
/// # Errors
///
/// Returns an error if the PEM is malformed or holds no private key.
pub fn parse_private_key(pem: &[u8]) -> Result<PrivateKey> {
    let mut reader = pem;
    for item in rustls_pemfile::read_all(&mut reader) {
        let key = match item.context("malformed PEM section")? {
            Item::Pkcs1Key(key) => PrivateKey::new(KeyFormat::Pkcs1, key.secret_pkcs1_der().to_vec()),
            Item::Pkcs8Key(key) => PrivateKey::new(KeyFormat::Pkcs8, key.secret_pkcs8_der().to_vec()),
            Item::Sec1Key(key) => PrivateKey::new(KeyFormat::Sec1, key.secret_sec1_der().to_vec()),
            _ => continue,
        };
        return Ok(key);
    }
    anyhow::bail!("no private key found in file")
}
