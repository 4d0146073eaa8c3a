use rsa::RsaPublicKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::codec::{decode_payload, decode_text, encode_payload, encode_text};
use crate::config::{ConfigError, SecretaryConfig};
use crate::errors::{Result, SecretaryError};
use crate::keys::{
    check_strength, decode_private_key, decode_public_key, encode_private_key, encode_public_key,
    generate_nonce, require, SessionKey,
};
use crate::provider::{CryptoProvider, SystemProvider, NONCE_LEN};
use crate::types::*;

/// The envelope service: key generation, validation, sealing and opening.
///
/// Holds no per-call state. One instance can be shared between threads and
/// used concurrently; every call decodes its keys fresh and drops them on
/// return.
#[derive(Debug, Clone, Default)]
pub struct Secretary<P = SystemProvider> {
    provider: P,
    config: SecretaryConfig,
}

impl Secretary {
    /// Default configuration, operating-system randomness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operating-system randomness with a custom configuration.
    pub fn with_config(config: SecretaryConfig) -> std::result::Result<Self, ConfigError> {
        Self::with_provider(SystemProvider, config)
    }
}

impl<P: CryptoProvider> Secretary<P> {
    /// Use a custom set of primitives.
    ///
    /// `config` is validated here, so hand-built configurations get the same
    /// checks as ones loaded from TOML or the environment.
    pub fn with_provider(
        provider: P,
        config: SecretaryConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &SecretaryConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /* ---------------- Keygen ---------------- */

    /// Generate an RSA-2048 key pair whose private half is encrypted under
    /// `passphrase`.
    pub fn generate_key_pair(&self, passphrase: &str) -> Result<KeyPair> {
        require(passphrase, "passphrase")?;

        let key = self
            .provider
            .generate_rsa(KEY_BITS)
            .map_err(|_| SecretaryError::SealFailed("key pair generation"))?;
        let public = encode_public_key(&RsaPublicKey::from(&key), &self.config)?;
        let private = encode_private_key(&key, passphrase, &self.config, &self.provider)?;

        debug!(bits = KEY_BITS, "generated key pair");
        Ok(KeyPair::new(public, String::clone(&private)))
    }

    /* ---------------- Validation ---------------- */

    /// Check that `key` is an encrypted private key readable with `passphrase`.
    pub fn validate_private_key(&self, key: &str, passphrase: &str) -> Result<()> {
        require(key, "key")?;
        decode_private_key(key, passphrase)?;
        Ok(())
    }

    /// Check that `key` is a readable public key of exactly 2048 bits.
    pub fn validate_public_key(&self, key: &str) -> Result<()> {
        require(key, "key")?;
        let public = decode_public_key(key)?;
        check_strength(&public)
    }

    /* ---------------- Seal ---------------- */

    /// Encrypt `payload` once and wrap its session key for every recipient.
    ///
    /// `wrapped_keys` in the result follow the order of `recipients`. All
    /// recipient keys are decoded before any cryptographic work starts; the
    /// first unreadable one aborts the call.
    pub fn seal<T, K>(&self, payload: &T, recipients: &[K]) -> Result<Envelope>
    where
        T: Serialize + ?Sized,
        K: AsRef<str>,
    {
        if recipients.is_empty() {
            return Err(SecretaryError::InvalidInput("recipient keys"));
        }
        let keys = recipients
            .iter()
            .map(|pem| self.recipient_key(pem.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let plaintext = encode_payload(payload)?;
        let session = SessionKey::generate(&self.provider)?;
        let nonce = generate_nonce(&self.provider)?;

        let sealed = self
            .provider
            .encrypt(session.as_bytes(), &nonce, SUITE_V1.as_bytes(), &plaintext)
            .map_err(|_| SecretaryError::SealFailed("payload encryption"))?;
        let mut content = Vec::with_capacity(NONCE_LEN + sealed.len());
        content.extend_from_slice(&nonce);
        content.extend_from_slice(&sealed);

        let wrapped_keys = keys
            .iter()
            .map(|key| {
                self.provider
                    .wrap_key(key, session.as_bytes())
                    .map(|wrapped| encode_text(&wrapped))
                    .map_err(|_| SecretaryError::SealFailed("session key wrap"))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            recipients = wrapped_keys.len(),
            content_len = content.len(),
            "sealed envelope"
        );
        Ok(Envelope {
            wrapped_keys,
            content: encode_text(&content),
        })
    }

    /// [`Secretary::seal`] for exactly one recipient.
    pub fn seal_single<T>(&self, payload: &T, key: &str) -> Result<SingleEnvelope>
    where
        T: Serialize + ?Sized,
    {
        require(key, "key")?;
        let Envelope {
            mut wrapped_keys,
            content,
        } = self.seal(payload, &[key])?;
        let wrapped_key = wrapped_keys
            .pop()
            .ok_or(SecretaryError::SealFailed("session key wrap"))?;
        Ok(SingleEnvelope {
            wrapped_key,
            content,
        })
    }

    fn recipient_key(&self, pem: &str) -> Result<RsaPublicKey> {
        let key = decode_public_key(pem)?;
        if self.config.enforce_recipient_strength {
            check_strength(&key)?;
        }
        Ok(key)
    }

    /* ---------------- Open ---------------- */

    /// Recover the payload as one recipient.
    ///
    /// Arguments are checked for emptiness in order: `content`,
    /// `wrapped_key`, `private_key`, `passphrase`.
    pub fn open<T: DeserializeOwned>(
        &self,
        content: &str,
        wrapped_key: &str,
        private_key: &str,
        passphrase: &str,
    ) -> Result<T> {
        require(content, "content")?;
        require(wrapped_key, "wrapped key")?;
        require(private_key, "key")?;
        require(passphrase, "passphrase")?;

        self.open_checked(content, wrapped_key, private_key, passphrase)
            .inspect_err(|err| debug!(error = %err, "failed to open envelope"))
    }

    /// [`Secretary::open`] into a schema-less CBOR value.
    pub fn open_value(
        &self,
        content: &str,
        wrapped_key: &str,
        private_key: &str,
        passphrase: &str,
    ) -> Result<serde_cbor::Value> {
        self.open(content, wrapped_key, private_key, passphrase)
    }

    fn open_checked<T: DeserializeOwned>(
        &self,
        content: &str,
        wrapped_key: &str,
        private_key: &str,
        passphrase: &str,
    ) -> Result<T> {
        let key = decode_private_key(private_key, passphrase)?;

        let content = decode_text(content).map_err(|_| SecretaryError::OpenFailed)?;
        let wrapped = decode_text(wrapped_key).map_err(|_| SecretaryError::OpenFailed)?;
        if content.len() < NONCE_LEN {
            return Err(SecretaryError::OpenFailed);
        }
        let (nonce, sealed) = content.split_at(NONCE_LEN);
        let nonce: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| SecretaryError::OpenFailed)?;

        let unwrapped = self
            .provider
            .unwrap_key(&key, &wrapped)
            .map_err(|_| SecretaryError::OpenFailed)?;
        let session = SessionKey::from_unwrapped(&unwrapped)?;

        let plaintext = self
            .provider
            .decrypt(session.as_bytes(), nonce, SUITE_V1.as_bytes(), sealed)
            .map_err(|_| SecretaryError::OpenFailed)?;
        let value = decode_payload(&plaintext)?;

        debug!(content_len = content.len(), "opened envelope");
        Ok(value)
    }
}

/* ---------------- Default-service shortcuts ---------------- */

/// [`Secretary::generate_key_pair`] with the default configuration.
pub fn generate_key_pair(passphrase: &str) -> Result<KeyPair> {
    Secretary::new().generate_key_pair(passphrase)
}

/// [`Secretary::validate_private_key`] with the default configuration.
pub fn validate_private_key(key: &str, passphrase: &str) -> Result<()> {
    Secretary::new().validate_private_key(key, passphrase)
}

/// [`Secretary::validate_public_key`] with the default configuration.
pub fn validate_public_key(key: &str) -> Result<()> {
    Secretary::new().validate_public_key(key)
}

/// [`Secretary::seal`] with the default configuration.
pub fn seal<T, K>(payload: &T, recipients: &[K]) -> Result<Envelope>
where
    T: Serialize + ?Sized,
    K: AsRef<str>,
{
    Secretary::new().seal(payload, recipients)
}

/// [`Secretary::seal_single`] with the default configuration.
pub fn seal_single<T>(payload: &T, key: &str) -> Result<SingleEnvelope>
where
    T: Serialize + ?Sized,
{
    Secretary::new().seal_single(payload, key)
}

/// [`Secretary::open`] with the default configuration.
pub fn open<T: DeserializeOwned>(
    content: &str,
    wrapped_key: &str,
    private_key: &str,
    passphrase: &str,
) -> Result<T> {
    Secretary::new().open(content, wrapped_key, private_key, passphrase)
}
