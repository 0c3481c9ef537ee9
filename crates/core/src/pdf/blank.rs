//! Blank-page detection and elimination.
//!
//! A page counts as blank iff it has no XObjects in its resources, no
//! annotations, and none of its content-stream operations is a marking
//! operator. Inert state changes (color, transforms, comments) do not
//! make a page non-blank.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use once_cell::sync::Lazy;
use tracing::warn;
use uuid::Uuid;

use super::PdfError;

/// Operators that paint something visible or participate in painting:
/// text showing/positioning, path construction and painting, XObject and
/// shading paint, clipping, color selection and graphics-state push/pop.
static MARKING_OPERATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Tj", "TJ", "'", "\"", "Tf", "TD", "Td", "Tm", "T*", "BT", "ET", "Do", "sh", "m", "l",
        "c", "re", "v", "y", "h", "S", "s", "f", "F", "B", "b", "n", "W", "W*", "cs", "CS", "sc",
        "SC", "scn", "SCN", "gs", "q", "Q",
    ]
    .into_iter()
    .collect()
});

/// Result of a blank-page pass. Always refers to a fresh artifact in the
/// scratch directory, even when nothing was removed, so downstream steps
/// consume a uniform "processed" file.
#[derive(Debug)]
pub struct CleanedPdf {
    pub path: PathBuf,
    pub file_name: String,
    /// Page numbers (1-based) that were removed, in ascending order.
    pub removed_pages: Vec<u32>,
}

impl CleanedPdf {
    pub fn removed_count(&self) -> usize {
        self.removed_pages.len()
    }
}

/// Strips blank pages from `input`, writing the result into `work_dir`.
///
/// A document with zero pages or with every page blank is a fatal
/// condition for the item, not a silent no-op.
pub fn strip_blank_pages(input: &Path, work_dir: &Path) -> Result<CleanedPdf, PdfError> {
    let mut doc = Document::load(input).map_err(|e| PdfError::Parse(e.to_string()))?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut blank: Vec<u32> = Vec::new();
    for (&number, &page_id) in &pages {
        if page_is_blank(&doc, page_id) {
            blank.push(number);
        }
    }

    if blank.len() == pages.len() {
        return Err(PdfError::AllPagesBlank);
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let suffix = Uuid::new_v4().simple().to_string();
    let file_name = format!("{}-processed-{}.pdf", stem, &suffix[..8]);
    let out_path = work_dir.join(&file_name);

    if blank.is_empty() {
        std::fs::copy(input, &out_path)?;
    } else {
        blank.sort_unstable();
        // Delete back-to-front so earlier page numbers stay valid.
        for &number in blank.iter().rev() {
            doc.delete_pages(&[number]);
        }
        doc.save(&out_path)
            .map_err(|e| PdfError::Write(e.to_string()))?;
    }

    Ok(CleanedPdf {
        path: out_path,
        file_name,
        removed_pages: blank,
    })
}

fn page_is_blank(doc: &Document, page_id: ObjectId) -> bool {
    let page_dict = match doc.get_dictionary(page_id) {
        Ok(d) => d,
        Err(e) => {
            warn!("could not inspect page {:?}: {}", page_id, e);
            return false;
        }
    };

    if has_xobjects(doc, page_dict) || has_annotations(doc, page_dict) {
        return false;
    }

    // Unreadable content keeps the page; only provably empty pages go.
    let content = match doc.get_page_content(page_id) {
        Ok(c) => c,
        Err(_) => return false,
    };
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return true;
    }
    let decoded = match Content::decode(&content) {
        Ok(c) => c,
        Err(_) => return false,
    };

    !decoded
        .operations
        .iter()
        .any(|op| MARKING_OPERATORS.contains(op.operator.as_str()))
}

fn has_xobjects(doc: &Document, page_dict: &Dictionary) -> bool {
    let resources = match page_dict.get(b"Resources").ok().and_then(|o| resolve_dict(doc, o)) {
        Some(d) => d,
        None => return false,
    };
    resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
        .map(|d| d.iter().next().is_some())
        .unwrap_or(false)
}

fn has_annotations(doc: &Document, page_dict: &Dictionary) -> bool {
    match page_dict.get(b"Annots") {
        Ok(Object::Array(entries)) => !entries.is_empty(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .ok()
            .and_then(|o| o.as_array().ok())
            .map(|entries| !entries.is_empty())
            .unwrap_or(false),
        _ => false,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_dict().ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testpdf::{build_pdf, BLANK_PAGE, TEXT_PAGE};
    use tempfile::TempDir;

    fn write_pdf(dir: &TempDir, name: &str, pages: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, build_pdf(pages)).unwrap();
        path
    }

    #[test]
    fn test_mixed_document_drops_only_blank_pages() {
        let dir = TempDir::new().unwrap();
        let input = write_pdf(&dir, "in.pdf", &[TEXT_PAGE, BLANK_PAGE, TEXT_PAGE]);

        let cleaned = strip_blank_pages(&input, dir.path()).unwrap();
        assert_eq!(cleaned.removed_pages, vec![2]);
        assert_eq!(cleaned.removed_count(), 1);

        let result = Document::load(&cleaned.path).unwrap();
        assert_eq!(result.get_pages().len(), 2);
    }

    #[test]
    fn test_all_blank_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = write_pdf(&dir, "in.pdf", &[BLANK_PAGE, BLANK_PAGE]);

        let err = strip_blank_pages(&input, dir.path()).unwrap_err();
        assert!(matches!(err, PdfError::AllPagesBlank));
    }

    #[test]
    fn test_no_blank_pages_still_produces_artifact() {
        let dir = TempDir::new().unwrap();
        let input = write_pdf(&dir, "in.pdf", &[TEXT_PAGE]);

        let cleaned = strip_blank_pages(&input, dir.path()).unwrap();
        assert!(cleaned.removed_pages.is_empty());
        assert!(cleaned.path.exists());
        assert_ne!(cleaned.path, input);

        let result = Document::load(&cleaned.path).unwrap();
        assert_eq!(result.get_pages().len(), 1);
    }

    #[test]
    fn test_empty_content_stream_is_blank() {
        let dir = TempDir::new().unwrap();
        let input = write_pdf(&dir, "in.pdf", &[TEXT_PAGE, ""]);

        let cleaned = strip_blank_pages(&input, dir.path()).unwrap();
        assert_eq!(cleaned.removed_pages, vec![2]);
    }

    #[test]
    fn test_path_painting_counts_as_marking() {
        let dir = TempDir::new().unwrap();
        // A filled rectangle and nothing else.
        let input = write_pdf(&dir, "in.pdf", &["10 10 100 100 re f", BLANK_PAGE]);

        let cleaned = strip_blank_pages(&input, dir.path()).unwrap();
        assert_eq!(cleaned.removed_pages, vec![2]);
    }

    #[test]
    fn test_unreadable_input_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = strip_blank_pages(&path, dir.path()).unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }
}
