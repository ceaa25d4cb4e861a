use std::io::{self, IsTerminal};

use anyhow::Context;
use owo_colors::{OwoColorize, Stream::Stdout};

use alumni_crypt::crypto::generate_key_pair;
use alumni_crypt::fingerprint;
use alumni_crypt::keys::store::KeyStore;

use crate::cli::KeygenArgs;

pub fn run_keygen(args: KeygenArgs) -> anyhow::Result<()> {
    // ── 1. Resolve the key store ─────────────────────────────────────────
    let store = KeyStore::open_default()?;
    store
        .ensure_dir()
        .with_context(|| format!("Failed to create {}", store.dir().display()))?;

    // ── 2. Overwrite guard ───────────────────────────────────────────────
    if store.exists(&args.user_id)? && !args.yes && !prompt_overwrite(&store, &args.user_id)? {
        println!("Aborted.");
        return Ok(());
    }

    // ── 3. Generate (slow: RSA-2048) and store ───────────────────────────
    println!("Generating RSA-2048 key pair for {}...", args.user_id);
    let pair = generate_key_pair()?;
    store
        .save(&args.user_id, &pair)
        .context("Failed to write key pair")?;

    // ── 4. Success output ────────────────────────────────────────────────
    println!(
        "{}",
        "Key pair generated successfully.".if_supports_color(Stdout, |t| t.green())
    );
    println!();
    println!("User:        {}", args.user_id);
    println!("Fingerprint: {}", fingerprint(&pair.public_key)?);
    println!("Public key:  {}", store.public_key_path(&args.user_id)?.display());
    println!("Private key: {} (0600)", store.private_key_path(&args.user_id)?.display());

    Ok(())
}

fn prompt_overwrite(store: &KeyStore, user_id: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        eprintln!("Use --yes to confirm overwrite in non-interactive mode");
        return Ok(false);
    }

    let identifier = store
        .load_public_key(user_id)
        .ok()
        .and_then(|pem| fingerprint(&pem).ok())
        .unwrap_or_else(|| "(unreadable)".to_string());

    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Keys for {} ({}) already exist. Overwrite? Messages encrypted to the old key will become unreadable",
            user_id, identifier
        ))
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("prompt failed: {}", e))
}
