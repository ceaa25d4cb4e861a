//! alumni-crypt library crate: hybrid RSA-OAEP + AES-256-CBC message
//! encryption, envelope types, and the local key store used by the CLI.
//!
//! Typical use:
//!
//! ```no_run
//! use alumni_crypt::crypto::{generate_key_pair, HybridCipher};
//!
//! let bob = generate_key_pair().unwrap();
//! let cipher = HybridCipher::new();
//! let envelope = cipher.encrypt("hi Bob", &bob.public_key).expect("message not sent");
//! assert_eq!(cipher.decrypt(&envelope, &bob.private_key).unwrap(), "hi Bob");
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;

pub use envelope::{EncryptedEnvelope, GroupEncryptedEnvelope, GroupRecipient};
pub use error::{CryptoError, CryptoResult, StoreError};
pub use keys::fingerprint::fingerprint;
