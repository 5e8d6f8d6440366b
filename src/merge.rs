//! Page concatenation of existing PDF files.
//!
//! The algorithm:
//! 1. Load every source document.
//! 2. Copy page attributes a page inherits from its page-tree ancestors
//!    (`MediaBox`, `Resources`, `CropBox`, `Rotate`) onto the page itself.
//! 3. Import every object of the later documents into the first one with
//!    object ids shifted past the current maximum.
//! 4. Hang all pages, in order, directly under the first document's root
//!    `Pages` node and drop what is no longer reachable.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::MergeError;

/// Page attributes that may be inherited through the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Concatenate the pages of `sources`, in order, into `target`.
///
/// With no sources the target is created empty (truncated if it exists).
/// Returns the number of pages written.
pub fn paste<P: AsRef<Path>>(target: impl AsRef<Path>, sources: &[P]) -> Result<usize, MergeError> {
    let target = target.as_ref();
    if sources.is_empty() {
        File::create(target)?;
        log::info!("no sources; created empty {}", target.display());
        return Ok(0);
    }

    let mut documents = Vec::with_capacity(sources.len());
    for source in sources {
        let source = source.as_ref();
        log::debug!("loading {}", source.display());
        documents.push(Document::load(source)?);
    }

    let mut merged = merge_documents(documents)?;
    let pages = merged.get_pages().len();
    merged.compress();

    let mut out = BufWriter::new(File::create(target)?);
    merged.save_to(&mut out)?;
    out.flush()?;
    log::info!(
        "pasted {} file(s), {} page(s) into {}",
        sources.len(),
        pages,
        target.display()
    );
    Ok(pages)
}

/// In-memory form of [`paste`] over serialized documents.
pub fn merge_bytes(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, MergeError> {
    let loaded = documents
        .iter()
        .map(|bytes| Document::load_mem(bytes))
        .collect::<Result<Vec<_>, _>>()?;
    let mut merged = merge_documents(loaded)?;
    merged.compress();
    let mut buffer = Vec::new();
    merged.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Merge loaded documents into the first one.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document, MergeError> {
    let mut documents = documents.into_iter();
    let mut dest = documents
        .next()
        .ok_or_else(|| MergeError::Malformed("no documents to merge".into()))?;
    let pages_id = root_pages_id(&dest)?;

    materialise_inherited(&mut dest)?;
    let mut page_refs: Vec<ObjectId> = dest.get_pages().into_values().collect();
    let mut max_id = dest.max_id;

    for mut source in documents {
        materialise_inherited(&mut source)?;
        let offset = max_id;
        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        for (old_id, object) in std::mem::take(&mut source.objects) {
            dest.objects
                .insert((old_id.0 + offset, old_id.1), remap_object_refs(object, offset));
        }
        page_refs.extend(source_pages.iter().map(|id| (id.0 + offset, id.1)));
        max_id = max_id.max(source.max_id + offset);
    }
    dest.max_id = max_id;

    for &page_id in &page_refs {
        dest.get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
    }
    let pages = dest.get_dictionary_mut(pages_id)?;
    pages.set(
        "Kids",
        Object::Array(page_refs.iter().map(|&id| Object::Reference(id)).collect()),
    );
    pages.set("Count", Object::Integer(page_refs.len() as i64));

    let pruned = dest.prune_objects();
    log::debug!(
        "merged {} page(s), pruned {} unreachable object(s)",
        page_refs.len(),
        pruned.len()
    );
    Ok(dest)
}

/// Id of the root `Pages` node: trailer `Root` → catalog `Pages`.
fn root_pages_id(doc: &Document) -> Result<ObjectId, MergeError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| MergeError::Malformed("trailer has no Root reference".into()))?;
    doc.get_dictionary(catalog_id)?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| MergeError::Malformed("catalog has no Pages reference".into()))
}

fn materialise_inherited(doc: &mut Document) -> Result<(), MergeError> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        let mut inherited = Vec::new();
        {
            let page = doc.get_dictionary(page_id)?;
            for key in INHERITABLE {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = find_inherited(doc, page, key) {
                    inherited.push((key, value));
                }
            }
        }
        if !inherited.is_empty() {
            let page = doc.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
    }
    Ok(())
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Recursively shift object references by `offset`.
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            remap_dict(&mut dict, offset);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            remap_dict(&mut stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dict(dict: &mut Dictionary, offset: u32) {
    for (_, value) in dict.iter_mut() {
        let taken = std::mem::replace(value, Object::Null);
        *value = remap_object_refs(taken, offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    /// A document with `num_pages` pages. With `inherit` set the MediaBox
    /// lives on the Pages node instead of each page.
    fn create_test_doc(num_pages: u32, inherit: bool) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let catalog_id = doc.new_object_id();
        let media_box = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]);

        let mut kids = Vec::new();
        for n in 0..num_pages {
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                format!("BT /F1 12 Tf 50 700 Td (Page {}) Tj ET", n + 1).into_bytes(),
            ));
            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("Contents", Object::Reference(content_id));
            if !inherit {
                page.set("MediaBox", media_box.clone());
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(num_pages as i64));
        pages.set("Kids", Object::Array(kids));
        if inherit {
            pages.set("MediaBox", media_box);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc
    }

    fn to_bytes(mut doc: Document) -> Vec<u8> {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn merge_empty_fails() {
        let err = merge_documents(vec![]).unwrap_err();
        assert!(err.to_string().contains("no documents to merge"));
    }

    #[test]
    fn merge_sums_page_counts() {
        let merged = merge_documents(vec![
            create_test_doc(2, false),
            create_test_doc(3, false),
            create_test_doc(1, false),
        ])
        .unwrap();
        assert_eq!(merged.get_pages().len(), 6);
    }

    #[test]
    fn merge_bytes_round_trips() {
        let merged = merge_bytes(vec![
            to_bytes(create_test_doc(1, false)),
            to_bytes(create_test_doc(4, true)),
        ])
        .unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn inherited_media_box_is_copied_to_pages() {
        let merged =
            merge_documents(vec![create_test_doc(1, false), create_test_doc(2, true)]).unwrap();
        for page_id in merged.get_pages().into_values() {
            let page = merged.get_dictionary(page_id).unwrap();
            assert!(page.has(b"MediaBox"), "page {page_id:?} lost its MediaBox");
        }
    }

    #[test]
    fn pages_keep_source_order() {
        let merged =
            merge_documents(vec![create_test_doc(2, false), create_test_doc(2, false)]).unwrap();
        let texts: Vec<String> = merged
            .get_pages()
            .into_values()
            .map(|id| {
                let content = merged.get_page_content(id).unwrap();
                String::from_utf8_lossy(&content).into_owned()
            })
            .collect();
        assert!(texts[0].contains("Page 1"));
        assert!(texts[1].contains("Page 2"));
        assert!(texts[2].contains("Page 1"));
        assert!(texts[3].contains("Page 2"));
    }

    #[test]
    fn paste_without_sources_truncates_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"old content").unwrap();
        let pages = paste(&target, &[] as &[&Path]).unwrap();
        assert_eq!(pages, 0);
        assert_eq!(std::fs::metadata(&target).unwrap().len(), 0);
    }

    #[test]
    fn paste_writes_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, to_bytes(create_test_doc(2, false))).unwrap();
        std::fs::write(&b, to_bytes(create_test_doc(3, true))).unwrap();
        let target = dir.path().join("out.pdf");

        let pages = paste(&target, &[&a, &b]).unwrap();
        assert_eq!(pages, 5);
        let doc = Document::load(&target).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn paste_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let missing = dir.path().join("missing.pdf");
        assert!(paste(&target, &[missing]).is_err());
    }
}
