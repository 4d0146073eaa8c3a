//! The trusted cryptographic primitives behind every envelope operation.
//!
//! [`Secretary`](crate::Secretary) never calls a cipher directly; it goes
//! through a [`CryptoProvider`]. [`SystemProvider`] is the production
//! implementation. Tests substitute seeded or failing providers to pin down
//! randomness and exercise failure paths.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Size of the symmetric session key in bytes.
pub const SESSION_KEY_LEN: usize = 32;

/// Size of the XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// A primitive refused or failed an operation.
///
/// Carries only the name of the operation; callers translate it into the
/// public error kind appropriate for their stage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0} failed")]
pub struct ProviderError(pub &'static str);

/// Asymmetric and symmetric primitives plus secure randomness.
///
/// Implementations must be safe to call from many threads at once.
pub trait CryptoProvider: Send + Sync {
    /// Fill `dest` with cryptographically secure random bytes.
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ProviderError>;

    /// Generate a new RSA private key with a modulus of `bits` bits.
    fn generate_rsa(&self, bits: usize) -> Result<RsaPrivateKey, ProviderError>;

    /// Encrypt a session key under a recipient's public key.
    fn wrap_key(&self, recipient: &RsaPublicKey, key: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Recover a session key with the recipient's private key.
    fn unwrap_key(
        &self,
        key: &RsaPrivateKey,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError>;

    /// Authenticated encryption of `plaintext` with associated data `aad`.
    fn encrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// Reverse [`CryptoProvider::encrypt`]; fails on any tampering.
    fn decrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError>;
}

/// RustCrypto primitives seeded from the operating system.
///
/// RSA-OAEP with SHA-256 for key wrapping, XChaCha20-Poly1305 for content,
/// [`OsRng`] for every random byte.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProvider;

impl CryptoProvider for SystemProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ProviderError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|_| ProviderError("random generation"))
    }

    fn generate_rsa(&self, bits: usize) -> Result<RsaPrivateKey, ProviderError> {
        let mut rng = OsRng;
        RsaPrivateKey::new(&mut rng, bits).map_err(|_| ProviderError("rsa key generation"))
    }

    fn wrap_key(&self, recipient: &RsaPublicKey, key: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let mut rng = OsRng;
        recipient
            .encrypt(&mut rng, Oaep::new::<Sha256>(), key)
            .map_err(|_| ProviderError("key wrap"))
    }

    fn unwrap_key(
        &self,
        key: &RsaPrivateKey,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        key.decrypt(Oaep::new::<Sha256>(), wrapped)
            .map(Zeroizing::new)
            .map_err(|_| ProviderError("key unwrap"))
    }

    fn encrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
            .map_err(|_| ProviderError("aead encrypt"))
    }

    fn decrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map(Zeroizing::new)
            .map_err(|_| ProviderError("aead decrypt"))
    }
}
