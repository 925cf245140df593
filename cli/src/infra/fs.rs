//! Filesystem infrastructure: implements `ScriptWriter`.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::ScriptWriter;

/// Writes boot scripts to the local filesystem.
pub struct LocalScriptWriter;

impl ScriptWriter for LocalScriptWriter {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write_script(&self, path: &Path, text: &str) -> Result<()> {
        let path = path.to_path_buf();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || write_private(&path, text.as_bytes()))
            .await
            .context("spawn_blocking for write_script")?
    }
}

/// Create or truncate `path` with owner-only permissions, then write `content`.
///
/// Scripts embed the validator key, so the mode is set before any byte lands.
///
/// # Errors
///
/// Returns an error if the parent directory or the file cannot be written.
pub fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write as _;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // `mode` only applies on creation; an existing file keeps its bits.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }

    file.write_all(content)
        .with_context(|| format!("writing file {}", path.display()))
}

/// Hex-encoded SHA-256 of `content`.
#[must_use]
pub fn sha256_hex(content: &[u8]) -> String {
    hex_encode(&Sha256::digest(content))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
