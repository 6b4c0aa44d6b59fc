//! Output generators.
//!
//! A `Generator` turns a `Book` into a single file in the configured
//! temporary directory and hands back ownership of it as a `TempPath`. The
//! file is deleted when the `TempPath` is dropped, so an artifact that never
//! reaches the output placer can't outlive the export that made it.
//!
//! Two kinds of generators exist:
//! - `EpubGenerator` renders EPUB 2 or EPUB 3 packages natively
//! - `ConvertGenerator` renders EPUB 3 and then runs an external converter to
//!   reach formats like MOBI, PDF or plain text
//!
//! `FormatRegistry` maps format keys onto generator factories.

mod convert;
pub use convert::*;

mod epub;
pub use epub::*;

mod registry;
pub use registry::*;

use crate::book::Book;
use crate::error::GenerationError;
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

pub trait Generator: Send + Sync {
    /// The format key this generator was resolved from, e.g. `epub-3` or `mobi`
    fn format(&self) -> &str;

    /// Canonical file suffix, without the leading dot
    fn extension(&self) -> &str;

    fn mime_type(&self) -> &str;

    /// Render `book` into a fresh temporary file.
    fn create(&self, book: &Book) -> Result<TempPath, GenerationError>;
}

/// Create a uniquely named, empty file in `dir` ending in `.<extension>`.
pub(crate) fn temp_file(dir: &Path, extension: &str) -> Result<NamedTempFile, GenerationError> {
    tempfile::Builder::new()
        .prefix("ws-book-")
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)
        .map_err(|source| GenerationError::TempFile {
            dir: dir.to_path_buf(),
            source,
        })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_files_are_unique_and_removed_on_drop() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let a = temp_file(dir.path(), "epub").expect("can create temp file");
        let b = temp_file(dir.path(), "epub").expect("can create temp file");

        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ws-book-"));
        assert!(name.ends_with(".epub"));

        let path = a.into_temp_path();
        assert!(path.exists());
        drop(path);
        drop(b);
        assert!(test_support::leftovers(dir.path()).is_empty());
    }

    #[test]
    fn missing_temp_dir_is_a_render_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let err = temp_file(&dir.path().join("missing"), "epub").unwrap_err();
        assert!(matches!(err, GenerationError::TempFile { .. }));
    }
}
