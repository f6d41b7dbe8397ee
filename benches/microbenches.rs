//! Criterion microbenches for pdflayout hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - YOLOv8 head decoding with NMS (decode_output)
//! - Letterbox preprocessing of a rendered page (preprocess)
//! - Drawing detections onto an in-memory PDF (annotate_document)
//! - Detections JSON parsing (from_json_str)

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::hint::black_box;

use image::RgbImage;
use lopdf::{dictionary, Object};
use pdflayout::annotate::{annotate_document, AnnotateOptions};
use pdflayout::layout::io_json::{from_json_str, to_json_string};
use pdflayout::layout::{BBoxXYXY, Detection, Document, Layer};
use pdflayout::model::backend::RawOutput;
use pdflayout::model::yolo::{decode_output, preprocess, YoloConfig};

/// Anchors of a 640x640 YOLOv8 head (80^2 + 40^2 + 20^2).
const ANCHORS: usize = 8400;
const CLASSES: usize = 11;

/// A head output with a few hundred confident, overlapping boxes.
fn synthetic_output() -> RawOutput {
    let features = 4 + CLASSES;
    let mut data = vec![0f32; features * ANCHORS];
    for anchor in 0..ANCHORS {
        let cell = (anchor % 80) as f32;
        data[anchor] = 8.0 * cell;
        data[ANCHORS + anchor] = 8.0 * (anchor / 80 % 80) as f32;
        data[2 * ANCHORS + anchor] = 40.0;
        data[3 * ANCHORS + anchor] = 24.0;
        let class = anchor % CLASSES;
        let score = if anchor % 23 == 0 { 0.9 } else { 0.01 };
        data[(4 + class) * ANCHORS + anchor] = score;
    }
    RawOutput {
        shape: vec![1, features, ANCHORS],
        data,
    }
}

fn synthetic_document(pages: u32, per_page: usize) -> Document {
    let labels = ["Text", "Title", "Figure", "Table", "Header"];
    let mut doc = Document::new();
    for _ in 0..pages {
        let detections = (0..per_page)
            .map(|i| {
                let y = 20.0 + 30.0 * i as f64;
                Detection::new(
                    labels[i % labels.len()],
                    BBoxXYXY::from_xyxy(50.0, y, 550.0, y + 25.0),
                    0.8,
                )
            })
            .collect();
        doc.push(Layer::new(detections));
    }
    doc
}

fn blank_pdf(pages: u32) -> lopdf::Document {
    let mut pdf = lopdf::Document::with_version("1.7");
    let pages_id = pdf.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
            }))
        })
        .collect();
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(i64::from(pages)),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    pdf.trailer.set("Root", Object::Reference(catalog_id));
    pdf
}

/// Benchmark head decoding plus NMS.
fn bench_decode(c: &mut Criterion) {
    let output = synthetic_output();
    let config = YoloConfig::default();

    let mut group = c.benchmark_group("yolo_decode");
    group.throughput(Throughput::Elements(ANCHORS as u64));
    group.bench_function("decode_output", |b| {
        b.iter(|| {
            let candidates = decode_output(black_box(&output), &config).unwrap();
            black_box(candidates)
        })
    });
    group.finish();
}

/// Benchmark letterboxing a US Letter page rendered at 72 DPI.
fn bench_preprocess(c: &mut Criterion) {
    let page = RgbImage::from_pixel(612, 792, image::Rgb([255, 255, 255]));

    c.bench_function("preprocess_letter_page", |b| {
        b.iter(|| black_box(preprocess(black_box(&page), 640)))
    });
}

/// Benchmark annotation of a 10-page document.
fn bench_annotate(c: &mut Criterion) {
    let doc = synthetic_document(10, 20);
    let options = AnnotateOptions::default();

    let mut group = c.benchmark_group("annotate");
    group.throughput(Throughput::Elements(doc.total_detections() as u64));
    group.bench_function("annotate_document", |b| {
        b.iter_batched(
            || blank_pdf(10),
            |mut pdf| {
                let report = annotate_document(&mut pdf, black_box(&doc), &options).unwrap();
                black_box((pdf, report))
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

/// Benchmark detections JSON parsing.
fn bench_json_parse(c: &mut Criterion) {
    let json = to_json_string(&synthetic_document(10, 20)).unwrap();

    let mut group = c.benchmark_group("detections_json");
    group.throughput(Throughput::Bytes(json.len() as u64));
    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let doc = from_json_str(black_box(&json)).unwrap();
            black_box(doc)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_preprocess,
    bench_annotate,
    bench_json_parse,
);
criterion_main!(benches);
