/// Decrypt commands: read an envelope JSON from a file or stdin, decrypt it
/// with a stored private key, and print the plaintext.
///
/// A failed decryption is fatal for that message: nothing but the error is
/// printed, never partial output.
use anyhow::Context;
use owo_colors::{OwoColorize, Stream::Stderr};

use alumni_crypt::crypto::HybridCipher;
use alumni_crypt::keys::store::KeyStore;
use alumni_crypt::{EncryptedEnvelope, GroupEncryptedEnvelope};

use crate::cli::DecryptArgs;
use crate::util::read_input;

pub fn run_decrypt(args: DecryptArgs) -> anyhow::Result<()> {
    let json = read_input(args.file.as_deref())?;
    let envelope = EncryptedEnvelope::from_json(&json).context("Invalid envelope JSON")?;
    if !envelope.is_complete() {
        return Err(report_failure(anyhow::anyhow!(
            "Envelope is incomplete: encryptedMessage, encryptedAESKey and iv are all required"
        )));
    }

    let store = KeyStore::open_default()?;
    let private_key = store.load_private_key(&args.user_id)?;

    let cipher = HybridCipher::new();
    let plaintext = cipher
        .decrypt(&envelope, &private_key)
        .map_err(report_failure)?;

    println!("{}", plaintext);
    Ok(())
}

pub fn run_group_decrypt(args: DecryptArgs) -> anyhow::Result<()> {
    let json = read_input(args.file.as_deref())?;
    let envelope =
        GroupEncryptedEnvelope::from_json(&json).context("Invalid group envelope JSON")?;
    if !envelope.is_complete() {
        return Err(report_failure(anyhow::anyhow!(
            "Group envelope is incomplete: encryptedMessage, iv and encryptedKeysMap are all required"
        )));
    }

    let store = KeyStore::open_default()?;
    let private_key = store.load_private_key(&args.user_id)?;

    let cipher = HybridCipher::new();
    let plaintext = cipher
        .decrypt_group(&envelope, &args.user_id, &private_key)
        .map_err(report_failure)?;

    println!("{}", plaintext);
    Ok(())
}

fn report_failure(err: impl Into<anyhow::Error>) -> anyhow::Error {
    eprintln!(
        "{} This message could not be decrypted.",
        "Error:".if_supports_color(Stderr, |t| t.red())
    );
    err.into()
}
