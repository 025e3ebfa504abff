//! PDF page counts and document info

use std::path::{Path, PathBuf};
use lopdf::{Dictionary, Document, Object};
use crate::error::{Error, Result};
use super::merge::load_document;

/// What `inspect` learns about a PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSummary {
    /// File that was inspected
    pub path: PathBuf,
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Read the page count from the catalog's Pages/Count
///
/// get_pages() walks the tree and can undercount nested trees in damaged
/// files, the Count field is what viewers report.
fn catalog_page_count(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()?;
    let pages_id = catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("Catalog has no Pages reference".to_string()))?;

    let count = doc
        .get_dictionary(pages_id)?
        .get(b"Count")
        .and_then(Object::as_i64)
        .map_err(|_| Error::General("Pages has no integer Count".to_string()))?;

    usize::try_from(count).map_err(|_| Error::General(format!("Negative page count: {}", count)))
}

/// Look up a text entry of the Info dictionary
fn info_text(info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Inspect a PDF file: page count plus title and author when present
pub fn inspect(path: &Path) -> Result<PdfSummary> {
    let doc = load_document(path)?;
    let page_count = catalog_page_count(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let info = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    Ok(PdfSummary {
        path: path.to_path_buf(),
        page_count,
        title: info.and_then(|dict| info_text(dict, b"Title")),
        author: info.and_then(|dict| info_text(dict, b"Author")),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    inspect(path).map(|summary| summary.page_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;
    use tempfile::TempDir;

    fn write_pdf_with_info(path: &Path, title: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        let page_id = doc.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::new();
        info.set("Title", Object::string_literal(title));
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.save(path).expect("Failed to write fixture");
    }

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_inspect_reads_title() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("101 cb3 reso.pdf");
        write_pdf_with_info(&path, "Resolution 101");

        let summary = inspect(&path).expect("Failed to inspect");
        assert_eq!(summary.page_count, 1);
        assert_eq!(summary.title.as_deref(), Some("Resolution 101"));
        assert_eq!(summary.author, None);
    }
}
