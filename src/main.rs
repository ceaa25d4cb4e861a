mod cli;
mod commands;
mod util;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so envelope JSON and plaintext on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "alumni_crypt=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen(args) => commands::keygen::run_keygen(args)?,
        Commands::Whoami(args) => commands::whoami::run_whoami(args)?,
        Commands::List => commands::list::run_list()?,
        Commands::Remove(args) => commands::remove::run_remove(args)?,
        Commands::Encrypt(args) => commands::encrypt::run_encrypt(args)?,
        Commands::Decrypt(args) => commands::decrypt::run_decrypt(args)?,
        Commands::GroupEncrypt(args) => commands::encrypt::run_group_encrypt(args)?,
        Commands::GroupDecrypt(args) => commands::decrypt::run_group_decrypt(args)?,
        Commands::Validate(args) => commands::keyformat::run_validate(args)?,
        Commands::Compact(args) => commands::keyformat::run_compact(args)?,
        Commands::Expand(args) => commands::keyformat::run_expand(args)?,
    }

    Ok(())
}
