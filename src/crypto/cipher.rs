use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use rand::Rng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cache::PublicKeyCache;
use super::pem::parse_private_key;
use super::{AES_KEY_LEN, ENVELOPE_VERSION, IV_LEN};
use crate::envelope::{EncryptedEnvelope, GroupEncryptedEnvelope, GroupRecipient};
use crate::error::{CryptoError, CryptoResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Hybrid RSA-OAEP + AES-256-CBC encryptor/decryptor.
///
/// Holds the public key cache; cloning the `Arc` from [`HybridCipher::cache`]
/// or passing one in via [`HybridCipher::with_cache`] lets several ciphers
/// share parsed keys. Safe to share across threads.
pub struct HybridCipher {
    cache: Arc<PublicKeyCache>,
}

impl HybridCipher {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(PublicKeyCache::new()))
    }

    pub fn with_cache(cache: Arc<PublicKeyCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<PublicKeyCache> {
        &self.cache
    }

    /// Encrypt `plain_text` for one recipient, or `None` if no envelope could
    /// be produced.
    ///
    /// Blank plaintext, an empty key, an unparsable key and internal cipher
    /// errors all give `None`; the reason is logged and otherwise dropped.
    /// Use [`HybridCipher::try_encrypt`] to get the reason.
    pub fn encrypt(&self, plain_text: &str, recipient_public_key_pem: &str) -> Option<EncryptedEnvelope> {
        self.try_encrypt(plain_text, recipient_public_key_pem)
            .map_err(|e| tracing::warn!(error = %e, "message encryption failed"))
            .ok()
    }

    /// Same as [`HybridCipher::encrypt`] but reports why it failed.
    pub fn try_encrypt(
        &self,
        plain_text: &str,
        recipient_public_key_pem: &str,
    ) -> CryptoResult<EncryptedEnvelope> {
        if plain_text.trim().is_empty() {
            return Err(CryptoError::InvalidInput("plaintext is empty".to_string()));
        }
        if recipient_public_key_pem.trim().is_empty() {
            return Err(CryptoError::InvalidInput(
                "no recipient public key provided".to_string(),
            ));
        }

        let (aes_key, iv) = fresh_key_and_iv();
        let ciphertext = aes_encrypt(plain_text.as_bytes(), &aes_key, &iv)?;

        let public_key = self.cache.get_or_parse(recipient_public_key_pem)?;
        let wrapped_key = wrap_key(&public_key, &aes_key)?;

        Ok(EncryptedEnvelope {
            encrypted_message: b64_encode(&ciphertext),
            encrypted_aes_key: b64_encode(&wrapped_key),
            iv: b64_encode(&iv),
            version: ENVELOPE_VERSION.to_string(),
        })
    }

    /// Recover the plaintext of `envelope` with the recipient's private key.
    ///
    /// Fails loudly: an incomplete envelope gives `MissingData`, and anything
    /// going wrong after that (bad key PEM, wrong key, tampered ciphertext)
    /// gives a single `DecryptionFailed`. A wrong private key is detected by
    /// the OAEP padding check and never yields garbage plaintext.
    pub fn decrypt(
        &self,
        envelope: &EncryptedEnvelope,
        recipient_private_key_pem: &str,
    ) -> CryptoResult<String> {
        require(&envelope.encrypted_message, "encryptedMessage")?;
        require(&envelope.encrypted_aes_key, "encryptedAESKey")?;
        require(&envelope.iv, "iv")?;
        require(recipient_private_key_pem, "recipient private key")?;
        check_version(&envelope.version)?;

        open(
            &envelope.encrypted_message,
            &envelope.encrypted_aes_key,
            &envelope.iv,
            recipient_private_key_pem,
        )
    }

    /// Encrypt `plain_text` once and wrap its AES key for every recipient.
    ///
    /// Unlike [`HybridCipher::encrypt`] this returns an error on failure.
    /// Recipient keys go through the shared cache. A repeated id keeps the
    /// last recipient's wrapped key.
    ///
    /// An empty `recipients` slice is an error (`GroupEncryptionFailed`,
    /// "no recipients"). Earlier clients instead returned an envelope with an
    /// empty `encryptedKeysMap` in that case.
    pub fn encrypt_for_group(
        &self,
        plain_text: &str,
        recipients: &[GroupRecipient],
    ) -> CryptoResult<GroupEncryptedEnvelope> {
        let group_error = |reason: String| CryptoError::GroupEncryptionFailed { reason };

        if recipients.is_empty() {
            return Err(group_error("no recipients".to_string()));
        }

        let (aes_key, iv) = fresh_key_and_iv();
        let ciphertext =
            aes_encrypt(plain_text.as_bytes(), &aes_key, &iv).map_err(|e| group_error(e.to_string()))?;

        let mut encrypted_keys_map = BTreeMap::new();
        for recipient in recipients {
            let public_key = self
                .cache
                .get_or_parse(&recipient.public_key_pem)
                .map_err(|e| group_error(format!("recipient '{}': {}", recipient.id, e)))?;
            let wrapped = wrap_key(&public_key, &aes_key)
                .map_err(|e| group_error(format!("recipient '{}': {}", recipient.id, e)))?;
            encrypted_keys_map.insert(recipient.id.clone(), b64_encode(&wrapped));
        }

        tracing::debug!(recipients = encrypted_keys_map.len(), "encrypted group message");

        Ok(GroupEncryptedEnvelope {
            encrypted_message: b64_encode(&ciphertext),
            iv: b64_encode(&iv),
            encrypted_keys_map,
            version: ENVELOPE_VERSION.to_string(),
        })
    }

    /// Decrypt a group envelope as the member `recipient_id`.
    ///
    /// Same failure semantics as [`HybridCipher::decrypt`]; a member with no
    /// entry in the key map gets `MissingData`.
    pub fn decrypt_group(
        &self,
        envelope: &GroupEncryptedEnvelope,
        recipient_id: &str,
        recipient_private_key_pem: &str,
    ) -> CryptoResult<String> {
        require(&envelope.encrypted_message, "encryptedMessage")?;
        require(&envelope.iv, "iv")?;
        let wrapped_key = envelope
            .encrypted_keys_map
            .get(recipient_id)
            .filter(|k| !k.is_empty())
            .ok_or(CryptoError::MissingData {
                field: "encryptedKeysMap entry",
            })?;
        require(recipient_private_key_pem, "recipient private key")?;
        check_version(&envelope.version)?;

        open(
            &envelope.encrypted_message,
            wrapped_key,
            &envelope.iv,
            recipient_private_key_pem,
        )
    }
}

impl Default for HybridCipher {
    fn default() -> Self {
        Self::new()
    }
}

fn require(value: &str, field: &'static str) -> CryptoResult<()> {
    if value.is_empty() {
        return Err(CryptoError::MissingData { field });
    }
    Ok(())
}

// An absent version predates the tag and is read as v1.
fn check_version(version: &str) -> CryptoResult<()> {
    if version.is_empty() || version == ENVELOPE_VERSION {
        Ok(())
    } else {
        Err(CryptoError::UnsupportedVersion(version.to_string()))
    }
}

/// Shared tail of single and group decryption. Every failure is logged with
/// its underlying cause and surfaced as `DecryptionFailed` with a short reason.
fn open(
    encrypted_message: &str,
    encrypted_aes_key: &str,
    iv: &str,
    private_key_pem: &str,
) -> CryptoResult<String> {
    let private_key: RsaPrivateKey =
        parse_private_key(private_key_pem).map_err(|e| fail("invalid private key", &e))?;

    let wrapped_key = b64_decode(encrypted_aes_key).map_err(|e| fail("invalid encryptedAESKey encoding", &e))?;
    let aes_key = Zeroizing::new(
        private_key
            .decrypt(Oaep::new::<Sha256>(), &wrapped_key)
            .map_err(|e| fail("RSA decryption failed", &e))?,
    );
    if aes_key.len() != AES_KEY_LEN {
        return Err(fail(
            "decrypted AES key has invalid length",
            &aes_key.len(),
        ));
    }

    let iv = b64_decode(iv).map_err(|e| fail("invalid iv encoding", &e))?;
    if iv.len() != IV_LEN {
        return Err(fail("invalid iv length", &iv.len()));
    }

    let ciphertext =
        b64_decode(encrypted_message).map_err(|e| fail("invalid encryptedMessage encoding", &e))?;
    let plaintext = Aes256CbcDec::new_from_slices(&aes_key, &iv)
        .map_err(|e| fail("AES decryption failed", &e))?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| fail("AES decryption failed", &e))?;

    String::from_utf8(plaintext).map_err(|e| fail("plaintext is not valid UTF-8", &e))
}

fn fail(reason: &str, detail: &dyn fmt::Display) -> CryptoError {
    tracing::warn!(%detail, reason, "message decryption failed");
    CryptoError::DecryptionFailed {
        reason: reason.to_string(),
    }
}

fn fresh_key_and_iv() -> (Zeroizing<[u8; AES_KEY_LEN]>, [u8; IV_LEN]) {
    let mut rng = rand::thread_rng();
    let key = Zeroizing::new(rng.gen::<[u8; AES_KEY_LEN]>());
    let iv: [u8; IV_LEN] = rng.gen();
    (key, iv)
}

fn aes_encrypt(plaintext: &[u8], key: &[u8; AES_KEY_LEN], iv: &[u8; IV_LEN]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| CryptoError::EncryptionFailed(format!("AES init: {}", e)))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn wrap_key(public_key: &RsaPublicKey, aes_key: &[u8; AES_KEY_LEN]) -> CryptoResult<Vec<u8>> {
    public_key
        .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), aes_key)
        .map_err(|e| CryptoError::EncryptionFailed(format!("RSA-OAEP key wrap: {}", e)))
}

fn b64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn b64_decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(text.trim())
}
