//! Error types for secretary-crypt operations.
//!
//! Messages for key and open failures are deliberately vague: a caller (or an
//! attacker probing an endpoint) must not be able to tell a wrong passphrase
//! from a corrupt key, or a bad wrapped key from tampered content.

use thiserror::Error;

/// Errors that can occur during key generation, validation, sealing, or opening.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretaryError {
    /// A required argument is empty or missing. Names the argument.
    #[error("{0} cannot be empty")]
    InvalidInput(&'static str),

    /// A key blob could not be decoded as the expected kind of key
    /// (includes a private key paired with the wrong passphrase).
    #[error("key is not readable")]
    KeyUnreadable,

    /// A public key decoded but its modulus is not exactly 2048 bits.
    #[error("provided key is {bits} bit, expected 2048 bit")]
    WeakKey { bits: usize },

    /// A cryptographic or encoding step of sealing failed after the inputs
    /// were validated.
    #[error("an error occurred while encrypting: {0}")]
    SealFailed(&'static str),

    /// Unwrapping, decryption, or payload decoding failed.
    #[error("an error occurred while decrypting")]
    OpenFailed,
}

/// Result type alias for secretary-crypt operations.
pub type Result<T> = std::result::Result<T, SecretaryError>;
