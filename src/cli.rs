use clap::{Parser, Subcommand};

use alumni_crypt::crypto::KeyKind;

#[derive(Parser)]
#[command(
    name = "alumni-crypt",
    version,
    about = "Provision RSA keys and encrypt/decrypt alumni-network messages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and store an RSA-2048 key pair for a user
    Keygen(KeygenArgs),
    /// Show a user's public key and fingerprint
    Whoami(WhoamiArgs),
    /// List stored identities
    List,
    /// Delete a user's stored keys
    Remove(RemoveArgs),
    /// Encrypt a message for one recipient and print the envelope JSON
    Encrypt(EncryptArgs),
    /// Decrypt an envelope JSON with a stored private key
    Decrypt(DecryptArgs),
    /// Encrypt a message once for several recipients
    GroupEncrypt(GroupEncryptArgs),
    /// Decrypt a group envelope as one of its members
    GroupDecrypt(DecryptArgs),
    /// Check whether a PEM file holds a valid RSA key
    Validate(ValidateArgs),
    /// Print a PEM key in compact form (armor and whitespace stripped)
    Compact(FileArgs),
    /// Rebuild a PEM key from its compact form
    Expand(ExpandArgs),
}

#[derive(Parser)]
pub struct KeygenArgs {
    /// User id to generate keys for (letters, digits, '-' and '_')
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Skip overwrite confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser)]
pub struct WhoamiArgs {
    #[arg(value_name = "USER_ID")]
    pub user_id: String,
}

#[derive(Parser)]
pub struct RemoveArgs {
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser)]
pub struct EncryptArgs {
    /// Recipient user id in the key store
    #[arg(long, value_name = "USER_ID", required_unless_present = "pubkey")]
    pub to: Option<String>,

    /// Recipient public key PEM file instead of a stored identity
    #[arg(long, value_name = "FILE", conflicts_with = "to")]
    pub pubkey: Option<String>,

    /// Message text (read from stdin if omitted)
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,
}

#[derive(Parser)]
pub struct DecryptArgs {
    /// User id whose private key decrypts the envelope
    #[arg(long = "as", value_name = "USER_ID")]
    pub user_id: String,

    /// Envelope JSON file (use - or omit for stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,
}

#[derive(Parser)]
pub struct GroupEncryptArgs {
    /// Recipient user ids (repeat for each member)
    #[arg(long = "to", value_name = "USER_ID", required = true)]
    pub to: Vec<String>,

    /// Message text (read from stdin if omitted)
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// PEM file (use - for stdin)
    #[arg(value_name = "FILE")]
    pub file: String,

    #[arg(long, value_enum, default_value = "public")]
    pub kind: KeyKind,
}

#[derive(Parser)]
pub struct FileArgs {
    /// Input file (use - for stdin)
    #[arg(value_name = "FILE")]
    pub file: String,
}

#[derive(Parser)]
pub struct ExpandArgs {
    /// Compact key file (use - for stdin)
    #[arg(value_name = "FILE")]
    pub file: String,

    #[arg(long, value_enum, default_value = "public")]
    pub kind: KeyKind,
}
