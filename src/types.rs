//! Wire shapes exchanged with callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Versioned algorithm suite identifier for the current envelope format.
///
/// - RSA-2048 with OAEP (SHA-256) wraps the session key per recipient
/// - XChaCha20-Poly1305 encrypts the payload once
///
/// The identifier is bound into every payload ciphertext as associated data.
pub const SUITE_V1: &str = "RSA2048-OAEP-SHA256+XChaCha20Poly1305";

/// Modulus size, in bits, of generated keys and of the public key policy.
pub const KEY_BITS: usize = 2048;

/// A freshly generated key pair.
///
/// `public` is an SPKI PEM (`-----BEGIN PUBLIC KEY-----`), `private` is the
/// matching PKCS#8 `EncryptedPrivateKeyInfo` PEM protected by the passphrase
/// given to the generator. The private half is wiped from memory on drop.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    public: String,
    private: String,
}

impl KeyPair {
    pub(crate) fn new(public: String, private: String) -> Self {
        Self { public, private }
    }

    /// The unencrypted public key PEM, safe to distribute.
    pub fn public_key(&self) -> &str {
        &self.public
    }

    /// The passphrase-protected private key PEM.
    pub fn private_key(&self) -> &str {
        &self.private
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// A payload sealed for one or more recipients.
///
/// `wrapped_keys[i]` belongs to the i-th recipient key passed to sealing;
/// `content` is shared by all of them. Serializes as
/// `{ "wrappedKeys": [...], "content": "..." }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Base64 RSA-OAEP encryptions of the session key, one per recipient.
    pub wrapped_keys: Vec<String>,
    /// Base64 of `nonce || AEAD(session_key, nonce, SUITE_V1, payload_frame)`.
    pub content: String,
}

impl Envelope {
    /// Number of recipients the envelope was sealed for.
    pub fn recipient_count(&self) -> usize {
        self.wrapped_keys.len()
    }

    /// The wrapped key of the i-th recipient, if present.
    pub fn wrapped_key(&self, index: usize) -> Option<&str> {
        self.wrapped_keys.get(index).map(String::as_str)
    }
}

/// The single-recipient form of [`Envelope`].
///
/// Serializes as `{ "wrappedKey": "...", "content": "..." }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SingleEnvelope {
    pub wrapped_key: String,
    pub content: String,
}

impl From<SingleEnvelope> for Envelope {
    fn from(single: SingleEnvelope) -> Self {
        Self {
            wrapped_keys: vec![single.wrapped_key],
            content: single.content,
        }
    }
}
