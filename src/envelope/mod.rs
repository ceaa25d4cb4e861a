//! Envelope module: the serialized shapes of encrypted messages.
//!
//! Field names on the wire are camelCase (`encryptedMessage`, `encryptedAESKey`,
//! `iv`, `version`, `encryptedKeysMap`) and must be preserved byte-for-byte by
//! storage and transport. All payload fields are plain strings (base64 or the
//! literal version tag), so an envelope fits in any text column or JSON body.
//!
//! Every field defaults to the empty string when absent from JSON. A partial
//! envelope therefore deserializes cleanly and is rejected later by
//! decryption with a `MissingData` error naming the first absent field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CryptoResult;

/// A message encrypted for a single recipient.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// Base64 AES-256-CBC ciphertext of the UTF-8 plaintext.
    #[serde(default)]
    pub encrypted_message: String,
    /// Base64 RSA-OAEP(SHA-256) wrapped one-time AES key.
    #[serde(default, rename = "encryptedAESKey")]
    pub encrypted_aes_key: String,
    /// Base64 16-byte AES initialization vector.
    #[serde(default)]
    pub iv: String,
    /// Envelope format tag, currently "v1".
    #[serde(default)]
    pub version: String,
}

/// A message encrypted once and keyed for several recipients.
///
/// Every entry in `encrypted_keys_map` wraps the same AES key. A `BTreeMap`
/// keeps serialization order stable; order carries no meaning.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupEncryptedEnvelope {
    #[serde(default)]
    pub encrypted_message: String,
    #[serde(default)]
    pub iv: String,
    /// Recipient id -> base64 wrapped AES key.
    #[serde(default)]
    pub encrypted_keys_map: BTreeMap<String, String>,
    #[serde(default)]
    pub version: String,
}

/// One member of a group message: an opaque id and their public key PEM.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecipient {
    #[serde(alias = "userId")]
    pub id: String,
    #[serde(alias = "publicKey")]
    pub public_key_pem: String,
}

impl GroupRecipient {
    pub fn new(id: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            public_key_pem: public_key_pem.into(),
        }
    }
}

impl EncryptedEnvelope {
    /// True when the three payload fields are all present.
    pub fn is_complete(&self) -> bool {
        !self.encrypted_message.is_empty() && !self.encrypted_aes_key.is_empty() && !self.iv.is_empty()
    }

    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl GroupEncryptedEnvelope {
    /// True when the shared body, the IV and at least one wrapped key are present.
    pub fn is_complete(&self) -> bool {
        !self.encrypted_message.is_empty() && !self.iv.is_empty() && !self.encrypted_keys_map.is_empty()
    }

    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
