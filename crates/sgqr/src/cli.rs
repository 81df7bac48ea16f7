use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sgqr_core::Tag;

/// SGQR payment QR payload generator and inspector.
#[derive(Parser)]
#[command(name = "sgqr", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Assemble a payload from a merchant configuration file.
    Generate(GenerateArgs),
    /// Decode a payload and print its structure.
    Parse(ParseArgs),
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to the merchant configuration JSON file.
    #[arg(long, default_value = "sgqr_config.json", env = "SGQR_CONFIG")]
    pub config: PathBuf,

    /// Write the payload text to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Maximum payload length in characters. Overrides the configuration
    /// file's `max_payload_length`.
    #[arg(long)]
    pub max_len: Option<usize>,

    /// What to do when the payload exceeds the length ceiling:
    /// reject, drop-optional, or drop-payment-systems.
    /// Overrides the configuration file's `overflow_policy`.
    #[arg(long)]
    pub overflow_policy: Option<String>,

    /// Also print the decoded structure as annotated JSON.
    #[arg(long)]
    pub structure: bool,

    /// Top-level tag carrying the SGQR ID block.
    #[arg(long, default_value = "51")]
    pub sgqr_tag: Tag,
}

#[derive(clap::Args)]
pub struct ParseArgs {
    /// The payload text to decode.
    pub payload: Option<String>,

    /// Read the payload from a file instead of the command line.
    #[arg(long, conflicts_with = "payload")]
    pub file: Option<PathBuf>,

    /// Print a plain tag/length/value listing instead of annotated JSON.
    #[arg(long)]
    pub flat: bool,

    /// Top-level tag expanded as the SGQR ID block.
    #[arg(long, default_value = "51")]
    pub sgqr_tag: Tag,
}
