//! # Command-Line Entry Point
//!
//! Hides export files in PNG images and reads them back.
//!
//! ## Usage
//!
//! ```bash
//! # Hide a CSV export in a photo (RGB LSB layout)
//! cargo run --bin stego -- encode --payload offres.csv --carrier photo.jpg \
//!   --format rgb-lsb --output offres.png
//!
//! # Hide a template on a 300x300 canvas with an icon (alpha magic layout)
//! cargo run --bin stego -- encode --payload template.json --icon copier.png \
//!   --bundle-name copieurs --output template.png
//!
//! # Read it back
//! cargo run --bin stego -- decode --input template.png --unwrap
//!
//! # Check how much fits
//! cargo run --bin stego -- capacity --carrier photo.jpg --payload-len 4096 --output report.json
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};
use log::{error, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use stego_container::common::config::StegoConfig;
use stego_container::common::export::{
    comparison_csv, comparison_file_name, ExportBundle, ExportKind, OfferRow,
};
use stego_container::common::logging::init_logger;
use stego_container::processing::{
    decode, embed_in_canvas, encode, open_carrier, save_png, to_data_url, to_png_bytes,
    CapacityReport, ContainerFormat, FormatVariant,
};

/// Command-line arguments for the stego binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    ///
    /// Example: config/stego.toml
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a payload in an image
    Encode(EncodeArgs),
    /// Recover a payload from an image
    Decode(DecodeArgs),
    /// Report how much a carrier can hold
    Capacity(CapacityArgs),
}

/// Overrides for the `[format]` config section
#[derive(ClapArgs, Debug)]
struct FormatArgs {
    /// Container layout: rgb-lsb or alpha-magic
    #[arg(long)]
    format: Option<FormatVariant>,

    /// 8-character magic for the alpha-magic layout
    #[arg(long)]
    magic: Option<String>,
}

#[derive(ClapArgs, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["payload", "offers"])))]
struct EncodeArgs {
    /// File whose bytes are hidden
    #[arg(long)]
    payload: Option<PathBuf>,

    /// JSON array of offers, hidden as a comparison CSV
    #[arg(long)]
    offers: Option<PathBuf>,

    /// Carrier image; without it a canvas is drawn
    #[arg(long)]
    carrier: Option<PathBuf>,

    /// Icon drawn on the canvas (ignored with --carrier)
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Wrap the payload in a named JSON export bundle
    #[arg(long)]
    bundle_name: Option<String>,

    /// Output PNG path (defaults to comparatif_offres_<date>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a data URL instead of writing a file
    #[arg(long)]
    data_url: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(ClapArgs, Debug)]
struct DecodeArgs {
    /// Stego image
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the payload (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Payload is an export bundle; write only its content
    #[arg(long)]
    unwrap: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(ClapArgs, Debug)]
struct CapacityArgs {
    /// Carrier image
    #[arg(long)]
    carrier: PathBuf,

    /// Payload size to check against the carrier
    #[arg(long)]
    payload_len: Option<usize>,

    /// Also write the report to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    format: FormatArgs,
}

fn main() {
    init_logger();

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = StegoConfig::load_or_default(args.config.as_deref())?;

    match args.command {
        Command::Encode(cmd) => run_encode(cmd, &config),
        Command::Decode(cmd) => run_decode(cmd, &config),
        Command::Capacity(cmd) => run_capacity(cmd, &config),
    }
}

/// Config format with command-line overrides applied.
fn resolve_format(overrides: &FormatArgs, config: &StegoConfig) -> Result<ContainerFormat> {
    let mut format = config.format.clone();
    if let Some(magic) = &overrides.magic {
        format.magic = magic.clone();
    }
    format.resolve(overrides.format)
}

fn read_payload(cmd: &EncodeArgs) -> Result<(Vec<u8>, ExportKind)> {
    if let Some(path) = &cmd.offers {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read offers {}", path.display()))?;
        let rows: Vec<OfferRow> = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a list of offers", path.display()))?;
        info!("Rendering {} offers as comparison CSV", rows.len());
        return Ok((comparison_csv(&rows).into_bytes(), ExportKind::Csv));
    }

    let path = cmd
        .payload
        .as_ref()
        .ok_or_else(|| anyhow!("either --payload or --offers is required"))?;
    let bytes =
        fs::read(path).with_context(|| format!("failed to read payload {}", path.display()))?;
    let kind = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportKind::Csv,
        _ => ExportKind::Json,
    };
    Ok((bytes, kind))
}

fn run_encode(cmd: EncodeArgs, config: &StegoConfig) -> Result<()> {
    let format = resolve_format(&cmd.format, config)?;
    let (mut payload, kind) = read_payload(&cmd)?;

    if let Some(name) = &cmd.bundle_name {
        let content = String::from_utf8(payload).context("bundled payload must be UTF-8 text")?;
        payload = ExportBundle::new(name.clone(), kind, content).to_payload()?;
    }

    let stego = match &cmd.carrier {
        Some(path) => {
            let carrier = open_carrier(path)?;
            info!(
                "Loaded carrier {} ({}x{})",
                path.display(),
                carrier.width(),
                carrier.height()
            );
            encode(carrier, &payload, &format)?
        }
        None => {
            let icon = cmd.icon.as_ref().map(open_carrier).transpose()?;
            embed_in_canvas(icon.as_ref(), &payload, &format, &config.canvas)?
        }
    };

    if cmd.data_url {
        println!("{}", to_data_url(&to_png_bytes(&stego)?));
        return Ok(());
    }

    let output = cmd
        .output
        .unwrap_or_else(|| PathBuf::from(comparison_file_name(Local::now().date_naive(), "png")));
    save_png(&stego, &output)?;

    info!(
        "Hid {} bytes in {} ({})",
        payload.len(),
        output.display(),
        format
    );
    Ok(())
}

fn run_decode(cmd: DecodeArgs, config: &StegoConfig) -> Result<()> {
    let format = resolve_format(&cmd.format, config)?;
    let image = open_carrier(&cmd.input)?;
    let mut payload = decode(&image, &format)?;

    if cmd.unwrap {
        let bundle = ExportBundle::from_payload(&payload).context("payload is not an export bundle")?;
        info!(
            "Bundle '{}' ({}) created {}",
            bundle.name,
            bundle.kind.extension(),
            bundle.created_at
        );
        payload = bundle.content.into_bytes();
    }

    write_output(cmd.output.as_deref(), &payload)
}

fn run_capacity(cmd: CapacityArgs, config: &StegoConfig) -> Result<()> {
    let format = resolve_format(&cmd.format, config)?;
    let image = open_carrier(&cmd.carrier)?;
    let report = CapacityReport::for_image(&image, &format, cmd.payload_len);

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = &cmd.output {
        report
            .export_to_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Report written to: {}", path.display());
    }

    if !report.fits() {
        return Err(anyhow!("payload does not fit in {}", cmd.carrier.display()));
    }
    Ok(())
}

fn write_output(path: Option<&Path>, payload: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", payload.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
