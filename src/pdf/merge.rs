//! PDF concatenation using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against malformed page trees with Parent cycles
const MAX_TREE_DEPTH: usize = 64;

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order their pages should appear
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Concatenate the pages of every input into a single PDF
///
/// Returns the number of pages written. Inputs are never modified.
///
/// # Example
///
/// ```no_run
/// use sla_merge::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("101 cb3 reso.pdf"),
///         PathBuf::from("101 stipulations.pdf"),
///     ],
///     output_path: PathBuf::from("101-merged.pdf"),
/// };
///
/// let pages = merge_pdfs(&options).expect("Failed to merge");
/// println!("{} pages", pages);
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    let mut documents = Vec::with_capacity(options.input_paths.len());
    for path in &options.input_paths {
        documents.push(load_document(path)?);
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Pages lose their old ancestors below, so pull inherited values down first
        flatten_inherited_attributes(&mut doc)?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);
    // new_object_id() must hand out ids above everything imported
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let catalog_id = merged.new_object_id();

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged.objects.insert(pages_id, Object::Dictionary(pages));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    // Old catalogs and page tree nodes are unreachable now
    let pruned = merged.prune_objects();
    debug!(pruned = pruned.len(), "dropped unreachable objects");

    merged.compress();
    merged.save(&options.output_path)?;

    debug!(
        output = %options.output_path.display(),
        pages = page_ids.len(),
        "wrote merged PDF"
    );

    Ok(page_ids.len())
}

/// Load a PDF, attributing parse failures to the file
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::UnreadablePdf {
        path: path.to_path_buf(),
        source,
    })?;

    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(doc)
}

/// Copy inheritable attributes from page tree ancestors onto each page
fn flatten_inherited_attributes(doc: &mut Document) -> Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = {
            let tree: &Document = doc;
            let page = tree.get_dictionary(page_id)?;
            INHERITABLE_ATTRIBUTES
                .iter()
                .copied()
                .filter(|key| !page.has(key))
                .filter_map(|key| find_inherited(tree, page, key).map(|value| (key, value)))
                .collect()
        };

        if inherited.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }

    Ok(())
}

/// Walk up the Parent chain looking for `key`
fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}
