//! Order-preserving PDF merging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use super::PdfError;

/// Summary of a merge: pages written and inputs that could not be read.
#[derive(Debug)]
pub struct MergeOutcome {
    pub merged_page_count: usize,
    pub skipped: Vec<String>,
}

/// Merges the given PDFs into one document at `output`, importing pages
/// in the exact order the inputs arrived. Inputs that are not readable
/// PDFs are skipped and reported; if nothing could be read the merge
/// fails as a whole.
pub fn merge_documents(
    inputs: &[(String, PathBuf)],
    output: &Path,
) -> Result<MergeOutcome, PdfError> {
    let mut max_id = 1;
    // Pages in arrival order; all other objects keyed by renumbered id.
    let mut all_pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut skipped: Vec<String> = Vec::new();

    for (name, path) in inputs {
        let bytes = std::fs::read(path)?;
        if !bytes.starts_with(b"%PDF") {
            skipped.push(name.clone());
            continue;
        }
        let mut doc = match Document::load_mem(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                debug!("skipping unreadable PDF {}: {}", name, e);
                skipped.push(name.clone());
                continue;
            }
        };
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            if let Ok(page) = doc.get_object(page_id) {
                all_pages.push((page_id, page.to_owned()));
            }
        }
        all_objects.extend(doc.objects);
    }

    if all_pages.is_empty() {
        return Err(PdfError::NoValidInput {
            names: skipped.join(", "),
        });
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut pages_root: Option<(ObjectId, Object)> = None;

    for (object_id, object) in all_objects {
        let type_name = dict_type(&object);
        match type_name.as_deref() {
            Some(b"Catalog") => {
                let id = catalog.as_ref().map(|(id, _)| *id).unwrap_or(object_id);
                catalog = Some((id, object));
            }
            Some(b"Pages") => {
                // Merge attributes of every Pages node into one root.
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    if let Some((_, ref existing)) = pages_root {
                        if let Ok(existing) = existing.as_dict() {
                            dict.extend(existing);
                        }
                    }
                    let id = pages_root.as_ref().map(|(id, _)| *id).unwrap_or(object_id);
                    pages_root = Some((id, Object::Dictionary(dict)));
                }
            }
            // Page objects re-attach below; outlines do not survive a merge.
            Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                document.objects.insert(object_id, object);
            }
        }
    }

    let (pages_id, pages_object) = pages_root.ok_or_else(|| {
        PdfError::Parse("merged inputs contain no page tree".to_string())
    })?;
    let (catalog_id, catalog_object) = catalog.ok_or_else(|| {
        PdfError::Parse("merged inputs contain no document catalog".to_string())
    })?;

    for (page_id, page) in &all_pages {
        if let Ok(dict) = page.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            document.objects.insert(*page_id, Object::Dictionary(dict));
        }
    }

    if let Ok(dict) = pages_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Count", all_pages.len() as i64);
        dict.set(
            "Kids",
            all_pages
                .iter()
                .map(|(id, _)| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        document.objects.insert(pages_id, Object::Dictionary(dict));
    }

    if let Ok(dict) = catalog_object.as_dict() {
        let mut dict = dict.clone();
        dict.set("Pages", pages_id);
        dict.remove(b"Outlines");
        document.objects.insert(catalog_id, Object::Dictionary(dict));
    }

    document.trailer.set("Root", catalog_id);
    document.max_id = document.objects.len() as u32;
    document.renumber_objects();
    document.compress();
    document
        .save(output)
        .map_err(|e| PdfError::Write(e.to_string()))?;

    Ok(MergeOutcome {
        merged_page_count: all_pages.len(),
        skipped,
    })
}

fn dict_type(object: &Object) -> Option<Vec<u8>> {
    let dict = object.as_dict().ok()?;
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testpdf::{build_pdf, TEXT_PAGE};
    use tempfile::TempDir;

    fn write_pdf(dir: &TempDir, name: &str, pages: &[&str]) -> (String, PathBuf) {
        let path = dir.path().join(name);
        std::fs::write(&path, build_pdf(pages)).unwrap();
        (name.to_string(), path)
    }

    #[test]
    fn test_merge_two_documents() {
        let dir = TempDir::new().unwrap();
        let a = write_pdf(&dir, "a.pdf", &[TEXT_PAGE, TEXT_PAGE]);
        let b = write_pdf(&dir, "b.pdf", &[TEXT_PAGE]);
        let output = dir.path().join("merged.pdf");

        let outcome = merge_documents(&[a, b], &output).unwrap();
        assert_eq!(outcome.merged_page_count, 3);
        assert!(outcome.skipped.is_empty());

        let merged = Document::load(&output).unwrap();
        assert_eq!(merged.get_pages().len(), 3);
    }

    #[test]
    fn test_merge_skips_non_pdf_input() {
        let dir = TempDir::new().unwrap();
        let a = write_pdf(&dir, "a.pdf", &[TEXT_PAGE]);
        let junk_path = dir.path().join("junk.pdf");
        std::fs::write(&junk_path, b"this is not a pdf").unwrap();
        let output = dir.path().join("merged.pdf");

        let outcome =
            merge_documents(&[a, ("junk.pdf".to_string(), junk_path)], &output).unwrap();
        assert_eq!(outcome.merged_page_count, 1);
        assert_eq!(outcome.skipped, vec!["junk.pdf".to_string()]);
    }

    #[test]
    fn test_merge_fails_when_nothing_readable() {
        let dir = TempDir::new().unwrap();
        let junk_path = dir.path().join("junk.pdf");
        std::fs::write(&junk_path, b"garbage").unwrap();
        let output = dir.path().join("merged.pdf");

        let err = merge_documents(&[("junk.pdf".to_string(), junk_path)], &output).unwrap_err();
        assert!(matches!(err, PdfError::NoValidInput { .. }));
    }
}
