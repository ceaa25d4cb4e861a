//! Crypto module: RSA key generation, hybrid RSA-OAEP + AES-256-CBC message
//! encryption, and PEM key-format helpers.
//!
//! Each message gets a fresh 256-bit AES key and 128-bit IV. The body is
//! encrypted with AES-256-CBC (PKCS#7 padding); the AES key is wrapped with
//! RSA-OAEP using SHA-256 for both the main digest and MGF1. Everything that
//! leaves this module is a base64 string inside an envelope.
//!
//! Failure styles differ on purpose and callers rely on them:
//! - [`HybridCipher::encrypt`] returns `None` on any failure.
//! - [`HybridCipher::decrypt`] and [`HybridCipher::encrypt_for_group`] return `Err`.
//! - [`validate_key`] always returns a `bool`.

mod cache;
mod cipher;
mod keygen;
mod pem;

pub use cache::PublicKeyCache;
pub use cipher::HybridCipher;
pub use keygen::{generate_key_pair, KeyPair};
pub use pem::{
    check_private_key, compact_to_pem, parse_private_key, parse_public_key, pem_to_compact,
    validate_key, KeyKind,
};

/// Envelope format tag written into every envelope.
pub const ENVELOPE_VERSION: &str = "v1";

/// RSA modulus size in bits.
pub const RSA_KEY_BITS: usize = 2048;

/// RSA public exponent (F4).
pub const RSA_PUBLIC_EXPONENT: u64 = 0x10001;

/// AES-256 key length in bytes.
pub const AES_KEY_LEN: usize = 32;

/// AES-CBC IV length in bytes.
pub const IV_LEN: usize = 16;

/// Default bound on the number of parsed public keys kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;
