use anyhow::Context;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use crate::crypto::KeyPair;
use crate::error::StoreError;

/// Environment variable overriding the key directory.
pub const KEY_DIR_ENV: &str = "ALUMNI_CRYPT_HOME";

const PUBLIC_SUFFIX: &str = ".pub.pem";
const PRIVATE_SUFFIX: &str = ".pem";
const TEMP_SUFFIX: &str = ".tmp";

/// Per-user PEM key files in a single directory.
///
/// `<dir>/<user>.pub.pem` holds the public key, `<dir>/<user>.pem` the
/// private key. Private key files are always 0600 on Unix.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

/// Resolve the default key directory: `$ALUMNI_CRYPT_HOME` if set, otherwise
/// `~/.alumni-crypt/keys`.
pub fn key_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(KEY_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or(StoreError::HomeDirNotFound)?;
    Ok(home.join(".alumni-crypt").join("keys"))
}

/// User ids become file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let ok = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

impl KeyStore {
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::at(key_dir()?))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {} directory", self.dir.display()))?;
        Ok(())
    }

    pub fn public_key_path(&self, user_id: &str) -> anyhow::Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{}{}", user_id, PUBLIC_SUFFIX)))
    }

    pub fn private_key_path(&self, user_id: &str) -> anyhow::Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{}{}", user_id, PRIVATE_SUFFIX)))
    }

    pub fn exists(&self, user_id: &str) -> anyhow::Result<bool> {
        Ok(self.public_key_path(user_id)?.exists())
    }

    pub fn has_private_key(&self, user_id: &str) -> anyhow::Result<bool> {
        Ok(self.private_key_path(user_id)?.exists())
    }

    /// Write both halves of `pair` for `user_id`, replacing any existing keys.
    pub fn save(&self, user_id: &str, pair: &KeyPair) -> anyhow::Result<()> {
        self.ensure_dir()?;
        let public_path = self.public_key_path(user_id)?;
        let private_path = self.private_key_path(user_id)?;

        // The private half only lands once its public half is on disk, so a
        // failed save never leaves a `.pem` without its matching `.pub.pem`.
        let staged = stage_private_key(&pair.private_key, &private_path)?;
        if let Err(e) = std::fs::write(&public_path, &pair.public_key) {
            let _ = std::fs::remove_file(&staged);
            return Err(e).with_context(|| {
                format!("Failed to write public key to {}", public_path.display())
            });
        }
        commit_private_key(&staged, &private_path)?;
        tracing::debug!(user_id, dir = %self.dir.display(), "saved key pair");
        Ok(())
    }

    pub fn load_public_key(&self, user_id: &str) -> anyhow::Result<String> {
        let path = self.public_key_path(user_id)?;
        if !path.exists() {
            return Err(StoreError::NoKeyPairFound(user_id.to_string()).into());
        }
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read public key from {}", path.display()))
    }

    /// Load the private key PEM for `user_id`.
    ///
    /// Refuses to read a key file whose permissions allow group or other
    /// access; the error message includes the `chmod` fix.
    pub fn load_private_key(&self, user_id: &str) -> anyhow::Result<Zeroizing<String>> {
        let path = self.private_key_path(user_id)?;
        if !path.exists() {
            return Err(StoreError::NoPrivateKeyFound(user_id.to_string()).into());
        }
        check_key_permissions(&path)?;
        let pem = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read private key from {}", path.display()))?;
        Ok(Zeroizing::new(pem))
    }

    /// Delete the key files for `user_id`. Returns false if none existed.
    pub fn remove(&self, user_id: &str) -> anyhow::Result<bool> {
        let mut removed = false;
        for path in [self.public_key_path(user_id)?, self.private_key_path(user_id)?] {
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                removed = true;
            }
        }
        Ok(removed)
    }

    /// User ids with a stored public key, sorted.
    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut users = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
        {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(user) = name.strip_suffix(PUBLIC_SUFFIX) {
                if validate_user_id(user).is_ok() {
                    users.push(user.to_string());
                }
            }
        }
        users.sort();
        Ok(users)
    }
}

/// Write a private key PEM atomically (temp file then rename) and set 0600.
pub fn write_private_key_atomic(pem: &str, dest: &Path) -> anyhow::Result<()> {
    let staged = stage_private_key(pem, dest)?;
    commit_private_key(&staged, dest)
}

/// Write `pem` to a fresh 0600 temp file next to `dest` and return its path.
///
/// The temp name embeds the destination file name and a random suffix, so
/// concurrent saves for different users (or the same user) never share one.
fn stage_private_key(pem: &str, dest: &Path) -> anyhow::Result<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Key destination path has no parent directory"))?;
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Key destination path has no file name"))?;

    let tmp = parent.join(format!(
        ".{}.{:016x}{}",
        file_name,
        rand::random::<u64>(),
        TEMP_SUFFIX
    ));
    if let Err(e) = write_restricted(&tmp, pem) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StoreError::AtomicWriteFailed(e).into());
    }
    Ok(tmp)
}

fn commit_private_key(staged: &Path, dest: &Path) -> anyhow::Result<()> {
    if let Err(e) = std::fs::rename(staged, dest) {
        let _ = std::fs::remove_file(staged);
        return Err(StoreError::AtomicWriteFailed(e).into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set 0600 permissions on {}", dest.display()))?;
    }

    Ok(())
}

// The temp file is created 0600 so key material is never briefly world-readable.
#[cfg(unix)]
fn write_restricted(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_restricted(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Check that the key file has exactly 0600 permissions (Unix only).
#[cfg(unix)]
pub fn check_key_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o600 {
        anyhow::bail!(
            "Key file {} has insecure permissions {:04o} (expected 0600). Fix with: chmod 600 {}",
            path.display(),
            mode,
            path.display()
        );
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn check_key_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
