//! pdflayout: layout detection annotations for PDF documents.
//!
//! pdflayout renders each page of a PDF, runs a pretrained YOLOv8 layout
//! detector over it, and draws the detected regions (titles, tables,
//! figures, text blocks, ...) back onto the PDF as colored rectangle and
//! note annotations.
//!
//! # Modules
//!
//! - [`labels`]: Label vocabularies and the label color table
//! - [`layout`]: Detection results (Detection, Layer, Document) and JSON I/O
//! - [`model`]: Model variants, detector loading, weight download, YOLOv8 decoding
//! - [`render`]: PDF page rasterization
//! - [`annotate`]: Drawing detections onto PDF pages
//! - [`validation`]: Detection checks before drawing
//! - [`pipeline`]: One PDF in, one annotated PDF out
//! - [`error`]: Error types for pdflayout operations

pub mod annotate;
pub mod error;
pub mod labels;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod validation;

use std::error::Error as _;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use error::PdfLayoutError;

use model::{DetectorOptions, YoloConfig};
use pipeline::{AnnotateRequest, Progress, DEFAULT_MODEL};

/// The pdflayout CLI application.
#[derive(Parser)]
#[command(name = "pdflayout")]
#[command(version, author, about)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Output PDF file (default: <input>_annotated.pdf).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout detection model. The cdla variants need an ONNX export
    /// (`yolo export model=<variant>.pt format=onnx`) saved as
    /// `<variant>.onnx` in the weights directory.
    #[arg(
        short,
        long,
        default_value = DEFAULT_MODEL,
        value_parser = ["yolov8l_doc", "yolov8s_doc", "yolov8n_doc", "yolov8m_cdla", "yolov8n_cdla"]
    )]
    model: String,

    /// Directory holding downloaded model weights.
    #[arg(long, env = "PDFLAYOUT_WEIGHTS_DIR", default_value = "weights")]
    weights_dir: PathBuf,

    /// Page render resolution.
    #[arg(long, default_value_t = render::DEFAULT_DPI)]
    dpi: f64,

    /// Minimum detection confidence.
    #[arg(long, default_value_t = 0.25)]
    conf: f32,

    /// IoU threshold for non-maximum suppression.
    #[arg(long, default_value_t = 0.7)]
    iou: f32,

    /// Also save detections to this JSON file.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Draw detections from a saved JSON file instead of running a model.
    #[arg(long, value_name = "FILE")]
    detections: Option<PathBuf>,

    /// Show debug logs and full error chains.
    #[arg(short, long)]
    verbose: bool,
}

/// Run the pdflayout CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PdfLayoutError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let verbose = cli.verbose;
    let result = run_annotate(cli);
    if verbose {
        if let Err(err) = &result {
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
        }
    }
    result
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when run() is called twice in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_annotate(cli: Cli) -> Result<(), PdfLayoutError> {
    let mut request = AnnotateRequest::new(cli.input);
    if let Some(output) = cli.output {
        request.output = output;
    }
    request.model = cli.model;
    request.dpi = cli.dpi;
    request.json_output = cli.json;
    request.detections_input = cli.detections;
    request.detector = DetectorOptions {
        weights_dir: cli.weights_dir,
        yolo: YoloConfig {
            confidence_threshold: cli.conf,
            iou_threshold: cli.iou,
            ..Default::default()
        },
    };

    println!("Processing PDF: {}", request.input.display());
    let summary = pipeline::annotate_pdf_with(&request, |progress| match progress {
        Progress::LoadingModel(name) => println!("Loading model: {}", name),
        Progress::ReadingDetections(path) => {
            println!("Reading detections: {}", path.display())
        }
        Progress::PageDetected { page, layer } => {
            println!("Processing page {}: {} detections", page.0 + 1, layer.len())
        }
        Progress::Saving(path) => println!("Saving annotated PDF to: {}", path.display()),
    })?;

    if let Some(json) = &request.json_output {
        println!("Detections saved to: {}", json.display());
    }
    println!("Done! Annotated PDF created successfully.");
    print!("{}", summary);
    Ok(())
}
