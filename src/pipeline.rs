//! End-to-end annotation of one PDF.
//!
//! Pages are rendered and detected strictly in order. The output PDF is
//! written once, after every page has been annotated, through a temporary
//! file in the output directory so a failed run leaves nothing behind.

use std::fmt;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::annotate::{annotate_document, AnnotateOptions, AnnotationReport};
use crate::error::PdfLayoutError;
use crate::layout::io_json::{read_detections_json, write_detections_json};
use crate::layout::{Document, Layer, PageKey};
use crate::model::{load_detector, DetectorOptions};
use crate::render::{scale_factor, PageRenderer, DEFAULT_DPI};
use crate::validation::validate_document;

/// Model used when none is requested.
pub const DEFAULT_MODEL: &str = "yolov8l_doc";

/// Everything needed to annotate one PDF.
#[derive(Clone, Debug)]
pub struct AnnotateRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Model name, resolved by [`crate::model::resolve`].
    pub model: String,
    pub detector: DetectorOptions,
    /// Render resolution; detections are in pixels at this DPI.
    pub dpi: f64,
    /// Where to save the detections JSON, if wanted.
    pub json_output: Option<PathBuf>,
    /// Previously saved detections to draw instead of running inference.
    pub detections_input: Option<PathBuf>,
}

impl AnnotateRequest {
    /// A request with default settings, writing `<stem>_annotated.pdf`
    /// beside the input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        Self {
            output: default_output_path(&input),
            input,
            model: DEFAULT_MODEL.to_string(),
            detector: DetectorOptions::default(),
            dpi: DEFAULT_DPI,
            json_output: None,
            detections_input: None,
        }
    }
}

/// Progress events reported while a request runs.
#[derive(Debug)]
pub enum Progress<'a> {
    LoadingModel(&'a str),
    ReadingDetections(&'a Path),
    PageDetected { page: PageKey, layer: &'a Layer },
    Saving(&'a Path),
}

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    /// The document that was drawn.
    pub document: Document,
    pub annotations: AnnotationReport,
}

impl RunSummary {
    pub fn total_detections(&self) -> usize {
        self.annotations.total_detections()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.annotations)
    }
}

/// `<dir>/<stem>_annotated<.ext>` for an input path.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{}_annotated.{}", stem, ext.to_string_lossy()),
        None => format!("{}_annotated", stem),
    };
    input.with_file_name(file_name)
}

/// Runs a request without progress reporting.
pub fn annotate_pdf(request: &AnnotateRequest) -> Result<RunSummary, PdfLayoutError> {
    annotate_pdf_with(request, |_| {})
}

/// Runs a request, reporting progress to `on_progress`.
pub fn annotate_pdf_with<F>(
    request: &AnnotateRequest,
    mut on_progress: F,
) -> Result<RunSummary, PdfLayoutError>
where
    F: FnMut(Progress<'_>),
{
    if !request.input.is_file() {
        return Err(PdfLayoutError::InputNotFound {
            path: request.input.clone(),
        });
    }

    let document = match &request.detections_input {
        Some(path) => {
            on_progress(Progress::ReadingDetections(path));
            read_detections_json(path)?
        }
        None => detect_pages(request, &mut on_progress)?,
    };

    let report = validate_document(&document);
    if !report.is_ok() {
        return Err(PdfLayoutError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        });
    }
    for issue in &report.issues {
        warn!("{}", issue);
    }

    if let Some(json_path) = &request.json_output {
        write_detections_json(json_path, &document)?;
        info!("Wrote detections to {}", json_path.display());
    }

    let mut pdf = lopdf::Document::load(&request.input).map_err(|e| {
        PdfLayoutError::processing(format!("Failed to open PDF {}", request.input.display()), e)
    })?;

    let options = AnnotateOptions {
        scale: scale_factor(request.dpi),
        ..Default::default()
    };
    let annotations = annotate_document(&mut pdf, &document, &options)?;

    on_progress(Progress::Saving(&request.output));
    save_pdf(&mut pdf, &request.output)?;
    info!("Saved annotated PDF to {}", request.output.display());

    Ok(RunSummary {
        output: request.output.clone(),
        document,
        annotations,
    })
}

/// Renders and detects every page of the input.
fn detect_pages<F>(request: &AnnotateRequest, on_progress: &mut F) -> Result<Document, PdfLayoutError>
where
    F: FnMut(Progress<'_>),
{
    on_progress(Progress::LoadingModel(&request.model));
    let mut detector = load_detector(&request.model, &request.detector)?;
    let renderer = PageRenderer::new(request.dpi)?;

    let mut document = Document::new();
    renderer.for_each_page(&request.input, |_, image| {
        let (detections, _) = detector.predict(Some(&image), None)?;
        let page = document.push(Layer::new(detections));
        if let Some(layer) = document.get(page) {
            on_progress(Progress::PageDetected { page, layer });
        }
        Ok(())
    })?;

    Ok(document)
}

fn save_pdf(pdf: &mut lopdf::Document, output: &Path) -> Result<(), PdfLayoutError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    pdf.save_to(tmp.as_file_mut())
        .map_err(|e| PdfLayoutError::processing(format!("Failed to write {}", output.display()), e))?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| PdfLayoutError::Io(e.error))?;
    Ok(())
}
