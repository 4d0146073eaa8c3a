//! Transport encoding and payload serialization.
//!
//! Payloads are never encrypted raw. Every value, including plain strings and
//! byte buffers, is wrapped in a versioned frame and serialized to CBOR so the
//! opener can reject frames it does not understand instead of guessing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::SecretaryError;

/// Version of the payload frame written inside every ciphertext.
pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Serialize)]
struct FrameRef<'a, T: ?Sized> {
    v: u32,
    value: &'a T,
}

#[derive(Deserialize)]
struct Frame<T> {
    v: u32,
    value: T,
}

/// Serialize a value to CBOR, prefixed with the self-describe tag.
pub fn to_cbor_canonical<T: Serialize + ?Sized>(v: &T) -> Result<Vec<u8>, serde_cbor::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_cbor::ser::Serializer::new(&mut buf);
    ser.self_describe()?;
    v.serialize(&mut ser)?;
    Ok(buf)
}

/// Deserialize a value from CBOR.
pub fn from_cbor<T: DeserializeOwned>(data: &[u8]) -> Result<T, serde_cbor::Error> {
    serde_cbor::from_slice::<T>(data)
}

/// Frame and serialize a payload ready for encryption.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<Zeroizing<Vec<u8>>, SecretaryError> {
    let frame = FrameRef {
        v: PAYLOAD_VERSION,
        value,
    };
    to_cbor_canonical(&frame)
        .map(Zeroizing::new)
        .map_err(|_| SecretaryError::SealFailed("payload serialization"))
}

/// Parse a decrypted frame back into the caller's payload type.
pub fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SecretaryError> {
    let frame: Frame<T> = from_cbor(bytes).map_err(|_| SecretaryError::OpenFailed)?;
    if frame.v != PAYLOAD_VERSION {
        return Err(SecretaryError::OpenFailed);
    }
    Ok(frame.value)
}

/// Standard padded base64, as used for `content` and wrapped keys.
pub fn encode_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Reverse [`encode_text`]. Surrounding whitespace is tolerated.
pub fn decode_text(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text.trim())
}
