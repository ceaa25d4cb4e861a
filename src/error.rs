use thiserror::Error;

/// Errors surfaced by the hybrid encryption core.
///
/// Variants carry a short, caller-safe reason only. The underlying library
/// error (RSA padding failure, cipher unpad error, PEM parser detail) is
/// logged through `tracing` at the point of failure and never exposed here.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Failed to decrypt message: missing or invalid {field}")]
    MissingData { field: &'static str },

    #[error("Failed to decrypt message: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Failed to decrypt message: unsupported envelope version '{0}'")]
    UnsupportedVersion(String),

    #[error("Failed to encrypt group message: {reason}")]
    GroupEncryptionFailed { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the local key store used by the CLI.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No key pair found for '{0}'. Run `alumni-crypt keygen {0}` first.")]
    NoKeyPairFound(String),

    #[error("No private key found for '{0}'")]
    NoPrivateKeyFound(String),

    #[error("Failed to write key file atomically")]
    AtomicWriteFailed(#[source] std::io::Error),

    #[error("Cannot determine home directory")]
    HomeDirNotFound,

    #[error("Invalid user id '{0}': use letters, digits, '-' or '_'")]
    InvalidUserId(String),
}
