//! Private-key credentials and their PEM text form.
//!
//! Pure functions only, no I/O. Reading key files lives in `crate::infra::keys`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encoding of the DER payload, which decides the PEM label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// `RSA PRIVATE KEY`, what Chef servers hand out for validators.
    Pkcs1,
    /// `PRIVATE KEY`
    Pkcs8,
    /// `EC PRIVATE KEY`
    Sec1,
}

impl KeyFormat {
    #[must_use]
    pub fn pem_label(self) -> &'static str {
        match self {
            Self::Pkcs1 => "RSA PRIVATE KEY",
            Self::Pkcs8 => "PRIVATE KEY",
            Self::Sec1 => "EC PRIVATE KEY",
        }
    }
}

/// Private key bytes. `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    format: KeyFormat,
    der: Vec<u8>,
}

impl PrivateKey {
    #[must_use]
    pub fn new(format: KeyFormat, der: Vec<u8>) -> Self {
        Self { format, der }
    }

    #[must_use]
    pub fn format(&self) -> KeyFormat {
        self.format
    }

    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.der.is_empty()
    }

    /// PEM text, split into lines without terminators.
    #[must_use]
    pub fn to_pem_lines(&self) -> Vec<String> {
        encode_lines(self.format.pem_label(), &self.der)
    }

    /// PEM text with `\n` line endings and a trailing newline.
    #[must_use]
    pub fn to_pem(&self) -> String {
        let mut text = self.to_pem_lines().join("\n");
        text.push('\n');
        text
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("format", &self.format)
            .field("der", &format_args!("<{} bytes>", self.der.len()))
            .finish()
    }
}

const PEM_LINE_WIDTH: usize = 64;

/// Base64 body wrapped at 64 columns between `BEGIN`/`END` markers.
#[must_use]
pub fn encode_lines(label: &str, der: &[u8]) -> Vec<String> {
    let body = STANDARD.encode(der);
    let mut lines = Vec::with_capacity(body.len() / PEM_LINE_WIDTH + 3);
    lines.push(format!("-----BEGIN {label}-----"));
    // base64 output is ASCII, so byte chunks are valid UTF-8.
    lines.extend(
        body.as_bytes()
            .chunks(PEM_LINE_WIDTH)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned()),
    );
    lines.push(format!("-----END {label}-----"));
    lines
}
