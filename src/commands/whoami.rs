use alumni_crypt::fingerprint;
use alumni_crypt::keys::store::KeyStore;

use crate::cli::WhoamiArgs;

fn try_copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => clipboard.set_text(text).is_ok(),
        Err(_) => false,
    }
}

pub fn run_whoami(args: WhoamiArgs) -> anyhow::Result<()> {
    let store = KeyStore::open_default()?;
    let public_key = store.load_public_key(&args.user_id)?;
    let fp = fingerprint(&public_key)?;
    let private_display = if store.has_private_key(&args.user_id)? {
        store.private_key_path(&args.user_id)?.display().to_string()
    } else {
        "(none)".to_string()
    };

    println!("User:        {}", args.user_id);
    println!("Fingerprint: {}", fp);
    println!("Public key:  {}", store.public_key_path(&args.user_id)?.display());
    println!("Private key: {}", private_display);
    println!();
    print!("{}", public_key);
    println!();

    if try_copy_to_clipboard(&public_key) {
        println!("Public key copied to clipboard.");
    } else {
        println!("(Clipboard unavailable, copy the public key manually)");
    }

    Ok(())
}
