use rsa::pkcs8::EncodePublicKey;
use sha2::{Digest, Sha256};

use crate::crypto::parse_public_key;
use crate::error::{CryptoError, CryptoResult};

/// Short fingerprint of an RSA public key: the first 8 bytes of SHA-256 over
/// the SPKI DER encoding, as colon-separated lowercase hex.
///
/// Hashing the DER rather than the PEM text makes the fingerprint independent
/// of line endings and of whether the key arrived as SPKI or PKCS#1.
pub fn fingerprint(public_key_pem: &str) -> CryptoResult<String> {
    let key = parse_public_key(public_key_pem)?;
    let der = key
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
    let digest = Sha256::digest(der.as_bytes());
    Ok(digest[..8]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":"))
}
