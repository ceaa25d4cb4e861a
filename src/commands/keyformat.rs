/// Key-format commands: validate a PEM key, and convert between PEM and the
/// compact storage form.
use owo_colors::{OwoColorize, Stream::Stdout};

use alumni_crypt::crypto::{check_private_key, compact_to_pem, pem_to_compact, validate_key, KeyKind};

use crate::cli::{ExpandArgs, FileArgs, ValidateArgs};
use crate::util::read_input;

pub fn run_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let pem = read_input(Some(args.file.as_str()))?;

    // Private keys get the detailed checker so the user learns what is wrong.
    let verdict = match args.kind {
        KeyKind::Private => check_private_key(&pem).map_err(|e| e.to_string()),
        KeyKind::Public => {
            if validate_key(&pem, KeyKind::Public) {
                Ok(())
            } else {
                Err("not a valid RSA public key PEM".to_string())
            }
        }
    };

    match verdict {
        Ok(()) => {
            println!("{}", "valid".if_supports_color(Stdout, |t| t.green()));
            Ok(())
        }
        Err(reason) => {
            println!("{} ({})", "invalid".if_supports_color(Stdout, |t| t.red()), reason);
            std::process::exit(1);
        }
    }
}

pub fn run_compact(args: FileArgs) -> anyhow::Result<()> {
    let pem = read_input(Some(args.file.as_str()))?;
    println!("{}", pem_to_compact(&pem));
    Ok(())
}

pub fn run_expand(args: ExpandArgs) -> anyhow::Result<()> {
    let compact = read_input(Some(args.file.as_str()))?;
    print!("{}", compact_to_pem(compact.trim(), args.kind));
    Ok(())
}
