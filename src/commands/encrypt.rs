/// Encrypt commands: build a single-recipient or group envelope and print it
/// as JSON on stdout. Status lines go to stderr so the JSON can be piped.
use owo_colors::{OwoColorize, Stream::Stderr};

use alumni_crypt::crypto::HybridCipher;
use alumni_crypt::keys::store::KeyStore;
use alumni_crypt::GroupRecipient;

use crate::cli::{EncryptArgs, GroupEncryptArgs};
use crate::util::{message_or_stdin, preview, read_input};

pub fn run_encrypt(args: EncryptArgs) -> anyhow::Result<()> {
    // ── 1. Resolve recipient public key ──────────────────────────────────
    let (recipient_label, public_key) = match (&args.pubkey, &args.to) {
        (Some(path), _) => (path.clone(), read_input(Some(path.as_str()))?),
        (None, Some(user_id)) => {
            let store = KeyStore::open_default()?;
            (user_id.clone(), store.load_public_key(user_id)?)
        }
        (None, None) => anyhow::bail!("Specify a recipient with --to or --pubkey"),
    };

    // ── 2. Read message ──────────────────────────────────────────────────
    let message = message_or_stdin(args.message)?;

    // ── 3. Encrypt ───────────────────────────────────────────────────────
    // encrypt() yields None for every failure; the cause is already logged.
    let cipher = HybridCipher::new();
    let Some(envelope) = cipher.encrypt(&message, &public_key) else {
        eprintln!(
            "{} Message not sent: encryption failed for {}.",
            "Error:".if_supports_color(Stderr, |t| t.red()),
            recipient_label
        );
        anyhow::bail!("message not sent");
    };

    // ── 4. Output ────────────────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    eprintln!(
        "{} for {} (iv {})",
        "Encrypted".if_supports_color(Stderr, |t| t.green()),
        recipient_label,
        preview(&envelope.iv, 8)
    );

    Ok(())
}

pub fn run_group_encrypt(args: GroupEncryptArgs) -> anyhow::Result<()> {
    let store = KeyStore::open_default()?;
    let recipients = args
        .to
        .iter()
        .map(|user_id| {
            store
                .load_public_key(user_id)
                .map(|pem| GroupRecipient::new(user_id.clone(), pem))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let message = message_or_stdin(args.message)?;

    let cipher = HybridCipher::new();
    let envelope = cipher.encrypt_for_group(&message, &recipients)?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    eprintln!(
        "{} for {} recipient(s)",
        "Encrypted".if_supports_color(Stderr, |t| t.green()),
        envelope.encrypted_keys_map.len()
    );

    Ok(())
}
