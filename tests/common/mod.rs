#![allow(dead_code)]

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Writes a PDF with `pages` empty US Letter pages. The MediaBox lives on
/// the page tree root and is inherited by every page.
pub fn write_pdf(path: &Path, pages: usize) {
    write_pdf_with(path, pages, Dictionary::new());
}

/// Like [`write_pdf`], with `entries` (e.g. `/CropBox`, `/Rotate`) set on
/// every page dictionary.
pub fn write_pdf_with(path: &Path, pages: usize, entries: Dictionary) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
            };
            for (key, value) in entries.iter() {
                page.set(key.clone(), value.clone());
            }
            Object::Reference(doc.add_object(page))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc.save(path).expect("save test pdf");
}

/// Loads the annotation dictionaries of a zero-based page.
pub fn page_annotations(path: &Path, page: usize) -> Vec<Dictionary> {
    let doc = Document::load(path).expect("load annotated pdf");
    let page_id = *doc
        .get_pages()
        .get(&(page as u32 + 1))
        .expect("page exists");
    let page = doc.get_dictionary(page_id).expect("page dictionary");

    let annots = match page.get(b"Annots") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .expect("annots array")
            .clone(),
        _ => return Vec::new(),
    };

    annots
        .iter()
        .map(|item| {
            let id = item.as_reference().expect("annotation reference");
            doc.get_dictionary(id).expect("annotation").clone()
        })
        .collect()
}

pub fn subtype(annotation: &Dictionary) -> String {
    let name = annotation
        .get(b"Subtype")
        .and_then(Object::as_name)
        .expect("subtype");
    String::from_utf8_lossy(name).into_owned()
}

pub fn numbers(annotation: &Dictionary, key: &[u8]) -> Vec<f64> {
    annotation
        .get(key)
        .and_then(Object::as_array)
        .expect("number array")
        .iter()
        .map(|item| match item {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => f64::from(*v),
            other => panic!("not a number: {other:?}"),
        })
        .collect()
}

pub fn text(annotation: &Dictionary, key: &[u8]) -> String {
    let bytes = annotation.get(key).and_then(Object::as_str).expect("string");
    String::from_utf8_lossy(bytes).into_owned()
}

/// Three detections on page 0, none on page 1.
pub const TWO_PAGE_DETECTIONS: &str = r#"{
  "0": {
    "boxes": [
      {"type": "Title", "box": [100.0, 50.0, 500.0, 90.0], "score": 0.91},
      {"type": "Table", "box": [100.0, 100.0, 300.0, 200.0], "score": 0.876},
      {"type": "Text", "box": [100.0, 220.0, 500.0, 400.0], "score": 0.5}
    ]
  },
  "1": {"boxes": []}
}"#;
