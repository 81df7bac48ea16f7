mod cli;

use std::fs;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Deserialize;

use sgqr_core::{AssembleOptions, DataElement, OverflowPolicy, ParseOptions, SgqrConfig};

fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();

    // Diagnostics go to stderr so stdout stays machine-consumable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    match cli.command {
        cli::Command::Generate(args) => run_generate(&args),
        cli::Command::Parse(args) => run_parse(&args),
    }
}

/// On-disk configuration: the merchant record plus the assembly overrides
/// that may live alongside it.
#[derive(Deserialize)]
struct GenerateFile {
    #[serde(flatten)]
    config: SgqrConfig,
    #[serde(default)]
    max_payload_length: Option<usize>,
    #[serde(default)]
    overflow_policy: Option<OverflowPolicy>,
}

fn run_generate(args: &cli::GenerateArgs) -> eyre::Result<()> {
    let raw = fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("read configuration file `{}`", args.config.display()))?;
    let file: GenerateFile = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("parse configuration file `{}`", args.config.display()))?;

    // Command-line flags win over the configuration file.
    let mut options = AssembleOptions {
        sgqr_id_tag: args.sgqr_tag,
        ..AssembleOptions::default()
    };
    if let Some(len) = file.max_payload_length {
        options.max_payload_len = len;
    }
    if let Some(policy) = file.overflow_policy {
        options.overflow_policy = policy;
    }
    if let Some(len) = args.max_len {
        options.max_payload_len = len;
    }
    if let Some(name) = &args.overflow_policy {
        options.overflow_policy = map_overflow_policy(name)?;
    }

    let payload = sgqr_core::generate(&file.config, &options).wrap_err("assemble payload")?;
    tracing::info!(len = payload.len(), "payload assembled and verified");

    match &args.out {
        Some(path) => {
            fs::write(path, payload.as_str())
                .wrap_err_with(|| format!("write payload to `{}`", path.display()))?;
            tracing::info!(path = %path.display(), "payload written");
        }
        None => println!("{payload}"),
    }

    if args.structure {
        let parse_options = ParseOptions {
            sgqr_id_tag: args.sgqr_tag,
        };
        let tree = sgqr_core::parse_payload(payload.as_str(), &parse_options)?;
        let described = sgqr_core::schema::describe_elements(&tree, args.sgqr_tag);
        println!("{}", serde_json::to_string_pretty(&described)?);
    }

    Ok(())
}

fn run_parse(args: &cli::ParseArgs) -> eyre::Result<()> {
    let payload = read_payload(args)?;
    let options = ParseOptions {
        sgqr_id_tag: args.sgqr_tag,
    };
    let tree = sgqr_core::parse_payload(&payload, &options).wrap_err("decode payload")?;

    if args.flat {
        print_flat(&tree, 0);
    } else {
        let described = sgqr_core::schema::describe_elements(&tree, args.sgqr_tag);
        println!("{}", serde_json::to_string_pretty(&described)?);
    }

    Ok(())
}

fn read_payload(args: &cli::ParseArgs) -> eyre::Result<String> {
    // Payload files usually end with a newline; the decoder must never see it.
    if let Some(path) = &args.file {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("read payload file `{}`", path.display()))?;
        return Ok(raw.trim().to_owned());
    }
    match &args.payload {
        Some(payload) => Ok(payload.trim().to_owned()),
        None => Err(eyre!(
            "no payload given; pass it as an argument or use --file"
        )),
    }
}

/// One line per element: tag, declared length, value. Nested blocks are
/// indented under their wrapper.
fn print_flat(elements: &[DataElement], depth: usize) {
    let pad = "  ".repeat(depth);
    for element in elements {
        match element {
            DataElement::Leaf { tag, value } => {
                println!("{pad}{tag} {:02} {value}", value.len());
            }
            DataElement::Group { tag, elements } => {
                let inner: usize = elements.iter().map(sgqr_core::codec::encoded_len).sum();
                println!("{pad}{tag} {inner:02}");
                print_flat(elements, depth + 1);
            }
        }
    }
}

fn map_overflow_policy(name: &str) -> eyre::Result<OverflowPolicy> {
    match name {
        "reject" => Ok(OverflowPolicy::Reject),
        "drop-optional" => Ok(OverflowPolicy::DropOptional),
        "drop-payment-systems" => Ok(OverflowPolicy::DropPaymentSystems),
        _ => Err(eyre!(
            "unrecognized overflow policy `{name}` (expected reject, drop-optional, or drop-payment-systems)"
        )),
    }
}
