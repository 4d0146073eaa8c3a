//! # secretary-crypt
//!
//! Multi-recipient hybrid encryption envelopes: a payload is encrypted once
//! and its session key is wrapped separately for every recipient, so each
//! recipient opens the same content with their own passphrase-protected key.
//!
//! ## Algorithm Suite
//!
//! - **Key pairs:** RSA-2048, public half as SPKI PEM, private half as
//!   PKCS#8 PEM encrypted with PBES2 (PBKDF2-HMAC-SHA256 + AES-256-CBC)
//! - **Key wrapping:** RSA-OAEP with SHA-256, one wrapped key per recipient
//! - **Payload encryption:** XChaCha20-Poly1305 under a fresh 32-byte session key
//! - **Payload format:** versioned CBOR frame, base64 for transport
//!
//! ## Example
//!
//! ```rust,no_run
//! use secretary_crypt::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let alice = generate_key_pair("correct-horse-battery")?;
//! let bob = generate_key_pair("tr0ub4dor&3")?;
//!
//! let envelope = seal("Hello world!", &[alice.public_key(), bob.public_key()])?;
//!
//! let for_alice: String = open(
//!     &envelope.content,
//!     &envelope.wrapped_keys[0],
//!     alice.private_key(),
//!     "correct-horse-battery",
//! )?;
//! let for_bob: String = open(
//!     &envelope.content,
//!     &envelope.wrapped_keys[1],
//!     bob.private_key(),
//!     "tr0ub4dor&3",
//! )?;
//!
//! assert_eq!(for_alice, "Hello world!");
//! assert_eq!(for_bob, "Hello world!");
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns a [`SecretaryError`]. A wrong passphrase and a
//! corrupt private key are both reported as [`SecretaryError::KeyUnreadable`];
//! a mismatched wrapped key and tampered content are both
//! [`SecretaryError::OpenFailed`].
//!
//! ## Security Considerations
//!
//! - Session keys are generated per call, never reused, and wiped on drop
//! - Decoded private keys live only for the duration of one call
//! - Key storage, distribution and trust are the caller's responsibility

mod codec;
mod config;
mod crypto;
mod errors;
mod keys;
mod provider;
mod types;

pub use codec::{decode_text, encode_text, from_cbor, to_cbor_canonical, PAYLOAD_VERSION};
pub use config::{ConfigError, LineEnding, SecretaryConfig, MIN_PBKDF2_ITERATIONS};
pub use crypto::*;
pub use errors::SecretaryError;
pub use keys::{check_strength, decode_private_key, decode_public_key, key_bits, MAX_KEY_BITS};
pub use provider::{CryptoProvider, ProviderError, SystemProvider, NONCE_LEN, SESSION_KEY_LEN};
pub use serde_cbor::Value;
pub use types::*;

// Primitive types appearing in the provider trait.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use zeroize::Zeroizing;
