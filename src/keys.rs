//! Key decoding, encoding and policy checks.
//!
//! Decoded keys are owned values: `RsaPrivateKey` wipes its primes on drop and
//! [`SessionKey`] wipes itself, so dropping on any return path releases the
//! sensitive material.

use pkcs5::pbes2;
use pkcs8::der::pem::PemLabel;
use pkcs8::der::Decode;
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{EncryptedPrivateKeyInfo, PrivateKeyInfo};
use rsa::pkcs1::{self, RsaPublicKey as Pkcs1PublicKey};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::SecretaryConfig;
use crate::errors::{Result, SecretaryError};
use crate::provider::{CryptoProvider, NONCE_LEN, SESSION_KEY_LEN};
use crate::types::KEY_BITS;

/// Largest recipient modulus accepted when decoding public keys.
pub const MAX_KEY_BITS: usize = 16_384;

const SPKI_LABEL: &str = "PUBLIC KEY";
const PKCS1_LABEL: &str = "RSA PUBLIC KEY";

const PBKDF2_SALT_LEN: usize = 16;
const AES_IV_LEN: usize = 16;

/// Ephemeral symmetric key for exactly one seal or open call.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SessionKey([u8; SESSION_KEY_LEN]);

impl SessionKey {
    pub(crate) fn generate(provider: &dyn CryptoProvider) -> Result<Self> {
        let mut key = SessionKey([0u8; SESSION_KEY_LEN]);
        provider
            .fill_random(&mut key.0)
            .map_err(|_| SecretaryError::SealFailed("session key generation"))?;
        Ok(key)
    }

    /// Accepts an unwrapped key only if it has the exact session key length.
    pub(crate) fn from_unwrapped(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; SESSION_KEY_LEN] = bytes.try_into().map_err(|_| SecretaryError::OpenFailed)?;
        Ok(SessionKey(raw))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; SESSION_KEY_LEN] {
        &self.0
    }
}

pub(crate) fn generate_nonce(provider: &dyn CryptoProvider) -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    provider
        .fill_random(&mut nonce)
        .map_err(|_| SecretaryError::SealFailed("nonce generation"))?;
    Ok(nonce)
}

/// Reject empty and zero-valued required text arguments.
pub(crate) fn require(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() || value == "0" {
        return Err(SecretaryError::InvalidInput(name));
    }
    Ok(())
}

/// Decode a public key PEM, SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
///
/// Any modulus up to [`MAX_KEY_BITS`] decodes; size policy is left to
/// [`check_strength`].
pub fn decode_public_key(pem: &str) -> Result<RsaPublicKey> {
    let (label, der) = pkcs8::der::pem::decode_vec(pem.trim().as_bytes())
        .map_err(|_| SecretaryError::KeyUnreadable)?;
    match label {
        SPKI_LABEL => {
            let spki = SubjectPublicKeyInfoRef::from_der(&der)
                .map_err(|_| SecretaryError::KeyUnreadable)?;
            spki.algorithm
                .assert_algorithm_oid(pkcs1::ALGORITHM_OID)
                .map_err(|_| SecretaryError::KeyUnreadable)?;
            let inner = spki
                .subject_public_key
                .as_bytes()
                .ok_or(SecretaryError::KeyUnreadable)?;
            rsa_public_key(inner)
        }
        PKCS1_LABEL => rsa_public_key(&der),
        _ => Err(SecretaryError::KeyUnreadable),
    }
}

fn rsa_public_key(pkcs1_der: &[u8]) -> Result<RsaPublicKey> {
    let parts = Pkcs1PublicKey::try_from(pkcs1_der).map_err(|_| SecretaryError::KeyUnreadable)?;
    let n = BigUint::from_bytes_be(parts.modulus.as_bytes());
    let e = BigUint::from_bytes_be(parts.public_exponent.as_bytes());
    RsaPublicKey::new_with_max_size(n, e, MAX_KEY_BITS).map_err(|_| SecretaryError::KeyUnreadable)
}

/// Decode an encrypted PKCS#8 private key PEM with its passphrase.
///
/// Unencrypted private keys are refused: a passphrase that is never checked
/// would make the passphrase gate meaningless.
pub fn decode_private_key(pem: &str, passphrase: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_encrypted_pem(pem.trim(), passphrase.as_bytes())
        .map_err(|_| SecretaryError::KeyUnreadable)
}

/// Modulus size of a public key in bits.
pub fn key_bits(key: &RsaPublicKey) -> usize {
    key.n().bits()
}

/// The fixed strength policy: exactly [`KEY_BITS`].
pub fn check_strength(key: &RsaPublicKey) -> Result<()> {
    match key_bits(key) {
        KEY_BITS => Ok(()),
        bits => Err(SecretaryError::WeakKey { bits }),
    }
}

pub(crate) fn encode_public_key(key: &RsaPublicKey, config: &SecretaryConfig) -> Result<String> {
    key.to_public_key_pem(config.line_ending.into())
        .map_err(|_| SecretaryError::SealFailed("public key encoding"))
}

/// PBES2 (PBKDF2-HMAC-SHA256, AES-256-CBC) encrypted PKCS#8 PEM.
pub(crate) fn encode_private_key(
    key: &RsaPrivateKey,
    passphrase: &str,
    config: &SecretaryConfig,
    provider: &dyn CryptoProvider,
) -> Result<Zeroizing<String>> {
    let mut salt = [0u8; PBKDF2_SALT_LEN];
    let mut iv = [0u8; AES_IV_LEN];
    provider
        .fill_random(&mut salt)
        .and_then(|_| provider.fill_random(&mut iv))
        .map_err(|_| SecretaryError::SealFailed("private key salt generation"))?;

    let plain = key
        .to_pkcs8_der()
        .map_err(|_| SecretaryError::SealFailed("private key encoding"))?;
    let info = PrivateKeyInfo::try_from(plain.as_bytes())
        .map_err(|_| SecretaryError::SealFailed("private key encoding"))?;
    let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(config.pbkdf2_iterations, &salt, &iv)
        .map_err(|_| SecretaryError::SealFailed("private key protection"))?;
    let encrypted = info
        .encrypt_with_params(params, passphrase.as_bytes())
        .map_err(|_| SecretaryError::SealFailed("private key protection"))?;

    encrypted
        .to_pem(EncryptedPrivateKeyInfo::PEM_LABEL, config.line_ending.into())
        .map_err(|_| SecretaryError::SealFailed("private key encoding"))
}
