#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::BigUint;
use secretary_crypt::*;

pub const PASSPHRASES: [&str; 3] = ["9xt^#]E#RqEW6NkZEKRw", "correct-horse-battery", "tr0ub4dor&3"];

/// Cheap key protection so fixtures don't dominate test time.
pub fn fast_config() -> SecretaryConfig {
    SecretaryConfig {
        pbkdf2_iterations: MIN_PBKDF2_ITERATIONS,
        ..SecretaryConfig::default()
    }
}

pub fn secretary() -> Secretary {
    Secretary::with_config(fast_config()).unwrap()
}

/// Three recipients, generated once per test binary.
pub fn recipients() -> &'static [KeyPair] {
    static KEYS: OnceLock<Vec<KeyPair>> = OnceLock::new();
    KEYS.get_or_init(|| {
        let secretary = secretary();
        PASSPHRASES
            .iter()
            .map(|pass| secretary.generate_key_pair(pass).unwrap())
            .collect()
    })
}

pub fn public_keys() -> Vec<&'static str> {
    recipients().iter().map(KeyPair::public_key).collect()
}

/// SPKI PEM of a fresh RSA key with the given modulus size.
pub fn public_key_pem(bits: usize) -> String {
    let key = SystemProvider.generate_rsa(bits).unwrap();
    RsaPublicKey::from(&key)
        .to_public_key_pem(LineEnding::LF)
        .unwrap()
}

pub fn weak_public_key() -> &'static str {
    static KEY: OnceLock<String> = OnceLock::new();
    KEY.get_or_init(|| public_key_pem(1024))
}

pub fn oversized_public_key() -> &'static str {
    static KEY: OnceLock<String> = OnceLock::new();
    KEY.get_or_init(|| public_key_pem(4096))
}

/// SPKI PEM of an 8192-bit public key, above the rsa crate's default decode
/// limit. Built from an odd modulus; it only ever encrypts.
pub fn huge_public_key() -> &'static str {
    static KEY: OnceLock<String> = OnceLock::new();
    KEY.get_or_init(|| {
        let n = BigUint::from_bytes_be(&[0xc5; 1024]);
        let e = BigUint::from(65_537u32);
        RsaPublicKey::new_with_max_size(n, e, MAX_KEY_BITS)
            .unwrap()
            .to_public_key_pem(LineEnding::LF)
            .unwrap()
    })
}

/// Deterministic randomness; everything else is the system provider.
pub struct SeededProvider {
    rng: Mutex<StdRng>,
}

impl SeededProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CryptoProvider for SeededProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ProviderError> {
        let mut rng = self.rng.lock().map_err(|_| ProviderError("random generation"))?;
        rng.fill_bytes(dest);
        Ok(())
    }

    fn generate_rsa(&self, bits: usize) -> Result<RsaPrivateKey, ProviderError> {
        SystemProvider.generate_rsa(bits)
    }

    fn wrap_key(&self, recipient: &RsaPublicKey, key: &[u8]) -> Result<Vec<u8>, ProviderError> {
        SystemProvider.wrap_key(recipient, key)
    }

    fn unwrap_key(
        &self,
        key: &RsaPrivateKey,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        SystemProvider.unwrap_key(key, wrapped)
    }

    fn encrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        SystemProvider.encrypt(key, nonce, aad, plaintext)
    }

    fn decrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        SystemProvider.decrypt(key, nonce, aad, ciphertext)
    }
}

/// Which primitive a [`FailingProvider`] refuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Random,
    Generate,
    Wrap,
    Unwrap,
    Encrypt,
    Decrypt,
}

/// Counts every primitive call and fails the configured one.
pub struct FailingProvider {
    fail: Option<Stage>,
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn failing(stage: Stage) -> Self {
        Self {
            fail: Some(stage),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn counting() -> Self {
        Self {
            fail: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, stage: Stage, name: &'static str) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail == Some(stage) {
            return Err(ProviderError(name));
        }
        Ok(())
    }
}

impl CryptoProvider for FailingProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), ProviderError> {
        self.enter(Stage::Random, "random generation")?;
        SystemProvider.fill_random(dest)
    }

    fn generate_rsa(&self, bits: usize) -> Result<RsaPrivateKey, ProviderError> {
        self.enter(Stage::Generate, "rsa key generation")?;
        SystemProvider.generate_rsa(bits)
    }

    fn wrap_key(&self, recipient: &RsaPublicKey, key: &[u8]) -> Result<Vec<u8>, ProviderError> {
        self.enter(Stage::Wrap, "key wrap")?;
        SystemProvider.wrap_key(recipient, key)
    }

    fn unwrap_key(
        &self,
        key: &RsaPrivateKey,
        wrapped: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        self.enter(Stage::Unwrap, "key unwrap")?;
        SystemProvider.unwrap_key(key, wrapped)
    }

    fn encrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        self.enter(Stage::Encrypt, "aead encrypt")?;
        SystemProvider.encrypt(key, nonce, aad, plaintext)
    }

    fn decrypt(
        &self,
        key: &[u8; SESSION_KEY_LEN],
        nonce: &[u8; NONCE_LEN],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        self.enter(Stage::Decrypt, "aead decrypt")?;
        SystemProvider.decrypt(key, nonce, aad, ciphertext)
    }
}
