//! Corpus discovery and loading.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::document::SourceDocument;
use crate::error::{ChunkError, Result};

/// Extensions picked up by [`discover_documents`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "docx", "pdf"];

/// Extensions [`load_document`] can read as text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

const ZONE_IDENTIFIER: &str = "Zone.Identifier";

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

fn is_candidate(path: &Path) -> bool {
    let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    if name.contains(ZONE_IDENTIFIER) {
        return false;
    }
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Find every candidate document under `root`, sorted by path.
///
/// A `root` that is itself a supported file yields just that file.
///
/// # Errors
///
/// Returns [`ChunkError::Io`] if `root` does not exist.
pub fn discover_documents(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if std::fs::metadata(root)?.is_file() {
        return Ok(if is_candidate(root) { vec![root.to_path_buf()] } else { Vec::new() });
    }

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_candidate(entry.path()))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    files.sort();
    Ok(files)
}

/// Read one document as text.
///
/// # Errors
///
/// Returns [`ChunkError::UnreadableDocument`] for formats without a text
/// reader (`.docx`, `.pdf`) and for files that cannot be read or are not
/// valid UTF-8.
pub fn load_document(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref();
    let unreadable = |message: String| ChunkError::UnreadableDocument {
        path: path.to_path_buf(),
        message,
    };

    let ext = extension_of(path).unwrap_or_default();
    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(unreadable(format!("no text reader for '.{ext}' files")));
    }

    let content = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    Ok(SourceDocument::new(file_name_of(path), content).with_source_path(path))
}

/// Discover and read every document under `root`.
///
/// Unreadable documents are logged and returned with empty content, so
/// the pipeline skips them without aborting the corpus.
///
/// # Errors
///
/// Returns [`ChunkError::Io`] if `root` does not exist.
pub fn load_corpus(root: impl AsRef<Path>) -> Result<Vec<SourceDocument>> {
    let root = root.as_ref();
    let paths = discover_documents(root)?;
    let mut unreadable = 0usize;

    let documents: Vec<SourceDocument> = paths
        .into_iter()
        .map(|path| match load_document(&path) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "treating unreadable document as empty");
                unreadable += 1;
                SourceDocument::new(file_name_of(&path), String::new()).with_source_path(path)
            }
        })
        .collect();

    info!(root = %root.display(), document_count = documents.len(), unreadable, "loaded corpus");
    Ok(documents)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_supported_files_sorted() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("lectures")).unwrap();
        fs::write(root.join("lectures/N02.txt"), "two").unwrap();
        fs::write(root.join("lectures/N01.md"), "one").unwrap();
        fs::write(root.join("book.pdf"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("book.pdf:Zone.Identifier"), "[ZoneTransfer]").unwrap();
        fs::write(root.join("image.png"), [0u8]).unwrap();

        let files = discover_documents(root).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.strip_prefix(root).unwrap().to_owned()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("book.pdf"),
                PathBuf::from("lectures/N01.md"),
                PathBuf::from("lectures/N02.txt"),
            ]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(discover_documents(temp.path().join("nope")), Err(ChunkError::Io(_))));
    }

    #[test]
    fn binary_formats_are_unreadable() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("deck.docx");
        fs::write(&path, [0u8, 159, 146, 150]).unwrap();
        assert!(matches!(load_document(&path), Err(ChunkError::UnreadableDocument { .. })));
    }

    #[test]
    fn corpus_keeps_unreadable_documents_as_empty() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "readable text").unwrap();
        fs::write(temp.path().join("b.txt"), [0xffu8, 0xfe, 0x00]).unwrap();
        fs::write(temp.path().join("c.pdf"), [0u8]).unwrap();

        let documents = load_corpus(temp.path()).unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].file_name, "a.txt");
        assert_eq!(documents[0].content, "readable text");
        assert!(documents[1].content.is_empty());
        assert!(documents[2].content.is_empty());
        assert_eq!(documents[2].source_path.as_deref(), Some(temp.path().join("c.pdf").as_path()));
    }
}
