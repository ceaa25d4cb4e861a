/// List command: one table row per stored identity.
use owo_colors::{OwoColorize, Stream::Stdout};

use alumni_crypt::fingerprint;
use alumni_crypt::keys::store::KeyStore;

pub fn run_list() -> anyhow::Result<()> {
    use comfy_table::{Cell, Color, Table};

    let store = KeyStore::open_default()?;
    let users = store.list()?;

    if users.is_empty() {
        println!(
            "{}",
            "No stored keys. Create one with alumni-crypt keygen <USER_ID>."
                .if_supports_color(Stdout, |t| t.yellow())
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["User", "Fingerprint", "Private key"]);

    for user in &users {
        let fp = store
            .load_public_key(user)
            .ok()
            .and_then(|pem| fingerprint(&pem).ok());
        let fp_cell = match fp {
            Some(fp) => Cell::new(fp),
            None => Cell::new("(invalid key)").fg(Color::Red),
        };
        let private_cell = if store.has_private_key(user)? {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![Cell::new(user), fp_cell, private_cell]);
    }

    println!("{table}");
    println!("Key directory: {}", store.dir().display());

    Ok(())
}
