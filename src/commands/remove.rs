/// Remove command: deletes a user's stored key files after confirmation.
use std::io::IsTerminal;

use owo_colors::{OwoColorize, Stream::Stdout};

use alumni_crypt::fingerprint;
use alumni_crypt::keys::store::KeyStore;

use crate::cli::RemoveArgs;

pub fn run_remove(args: RemoveArgs) -> anyhow::Result<()> {
    let store = KeyStore::open_default()?;

    if !store.exists(&args.user_id)? && !store.has_private_key(&args.user_id)? {
        println!("No stored keys for {}.", args.user_id);
        return Ok(());
    }

    let identifier = store
        .load_public_key(&args.user_id)
        .ok()
        .and_then(|pem| fingerprint(&pem).ok())
        .unwrap_or_else(|| "(unreadable)".to_string());

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            eprintln!("Use --yes to confirm removal in non-interactive mode");
            return Ok(());
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete keys for {} ({})? Messages encrypted to this key can no longer be read",
                args.user_id, identifier
            ))
            .default(false)
            .interact()
            .map_err(|e| anyhow::anyhow!("prompt failed: {}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.remove(&args.user_id)?;
    println!(
        "{} ({} {})",
        "Removed.".if_supports_color(Stdout, |t| t.green()),
        args.user_id,
        identifier
    );

    Ok(())
}
