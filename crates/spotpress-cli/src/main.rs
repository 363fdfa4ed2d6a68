//! spotpress operator CLI.
//!
//! Runs the design pipeline from the command line: validate a saved
//! design, price it against the design-history service, render a
//! preview, simplify an uploaded image, or print the content hash.

use clap::{Parser, Subcommand};
use spotpress_color::simplify_image;
use spotpress_core::{DesignDocument, design_hash};
use spotpress_prepress::{
    CheckoutOutcome, CheckoutWorkflow, DesignHistoryClient, HttpDesignHistory,
    InMemoryDesignHistory, Money, ProductSelection, analyze_design_complexity,
    validate_design_colors,
};
use spotpress_render::render_preview;
use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "spotpress", version, about = "Spot-colour print preparation tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a design against the spot-colour printing rules.
    Validate {
        /// Design document (JSON).
        design: PathBuf,
    },
    /// Price a design: validation, fees and the first-time-print check.
    Quote {
        design: PathBuf,
        /// Design-history endpoint; omitted = treat as first-time.
        #[arg(long)]
        history_url: Option<String>,
        /// Base product price in pence.
        #[arg(long, default_value_t = 499)]
        base_price_pence: u32,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long, default_value = "sticker")]
        product_type: String,
    },
    /// Render a PNG preview of a design.
    Preview {
        design: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Longest edge of the preview in pixels.
        #[arg(long, default_value_t = 512)]
        max_dim: u32,
    },
    /// Quantize an image down to a printable spot-colour palette.
    Simplify {
        image: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Target palette size.
        #[arg(short = 'n', long, default_value_t = 2)]
        colors: usize,
    },
    /// Print the content hash of a design.
    Hash { design: PathBuf },
    /// Advisory complexity report for a design.
    Complexity { design: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    match cli.command {
        Command::Validate { design } => {
            let document = load_design(&design)?;
            let outcome = validate_design_colors(&document);
            println!("{}", outcome.message);
            Ok(if outcome.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Quote {
            design,
            history_url,
            base_price_pence,
            quantity,
            product_type,
        } => {
            let document = load_design(&design)?;
            let selection = ProductSelection {
                product_id: file_stem(&design),
                name: document.name.clone(),
                base_price: Money::from_pence(base_price_pence),
                quantity,
                product_type,
                size: None,
                color: None,
            };
            let outcome = match history_url {
                Some(url) => {
                    quote(&document, &selection, HttpDesignHistory::new(url)).await?
                }
                None => quote(&document, &selection, InMemoryDesignHistory::new()).await?,
            };
            match outcome {
                CheckoutOutcome::Rejected(validation) => {
                    println!("{}", validation.message);
                    Ok(ExitCode::FAILURE)
                }
                CheckoutOutcome::Ready(item) => {
                    println!("{}", serde_json::to_string_pretty(&item)?);
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
        Command::Preview {
            design,
            output,
            max_dim,
        } => {
            let document = load_design(&design)?;
            let preview = render_preview(&document, max_dim);
            write_png(&output, preview.width(), preview.height(), preview.as_raw())?;
            log::info!("wrote preview to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Simplify {
            image,
            output,
            colors,
        } => {
            let bytes = fs::read(&image)?;
            let simplified = simplify_image(&bytes, colors)?;
            fs::write(&output, &simplified.png)?;
            println!(
                "palette: {}",
                if simplified.palette.is_empty() {
                    "(paper only)".to_string()
                } else {
                    simplified.palette.join(", ")
                }
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Hash { design } => {
            let document = load_design(&design)?;
            println!("{}", design_hash(&document)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Complexity { design } => {
            let document = load_design(&design)?;
            let report = analyze_design_complexity(&document);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn quote<H: DesignHistoryClient>(
    document: &DesignDocument,
    selection: &ProductSelection,
    history: H,
) -> Result<CheckoutOutcome, Box<dyn Error>> {
    let workflow = CheckoutWorkflow::new(history);
    Ok(workflow.prepare(document, selection).await?)
}

fn load_design(path: &Path) -> Result<DesignDocument, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    Ok(DesignDocument::from_json(&json)?)
}

/// Write raw RGBA pixels out as a PNG file.
fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string())
}
