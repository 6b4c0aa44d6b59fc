//! Where books come from.
//!
//! The exporter only knows the two traits below: a `ProviderFactory` binds a
//! language and a set of generation options to a `BookProvider`, which then
//! resolves titles into `Book`s. `Library` is the implementation shipped with
//! the tool; it reads JSON manifests laid out as `<root>/<lang>/<title>.json`,
//! with picture files referenced relative to the manifest.

use super::{Book, Chapter, Credit, GenerationOptions, Metadata, Picture};
use crate::error::ContentError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Resolves a title into a book, for one language.
pub trait BookProvider {
    fn get(&self, title: &str) -> Result<Book, ContentError>;
}

/// Creates providers bound to a language and generation options.
pub trait ProviderFactory: Send + Sync {
    fn provider(
        &self,
        lang: &str,
        options: &GenerationOptions,
    ) -> Result<Box<dyn BookProvider>, ContentError>;
}

/// A directory of book manifests, one sub-directory per language.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new<P: Into<PathBuf>>(root: P) -> Library {
        Library { root: root.into() }
    }
}

impl ProviderFactory for Library {
    fn provider(
        &self,
        lang: &str,
        options: &GenerationOptions,
    ) -> Result<Box<dyn BookProvider>, ContentError> {
        let valid = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let dir = self.root.join(lang);
        if !valid || !dir.is_dir() {
            return Err(ContentError::UnsupportedLanguage(lang.to_string()));
        }

        Ok(Box::new(LibraryProvider {
            dir,
            lang: lang.to_string(),
            options: *options,
        }))
    }
}

/// Reads books for a single language out of a `Library`.
#[derive(Debug)]
pub struct LibraryProvider {
    dir: PathBuf,
    lang: String,
    options: GenerationOptions,
}

#[derive(Deserialize)]
struct Manifest {
    title: Option<String>,
    #[serde(default)]
    metadata: Metadata,
    cover: Option<String>,
    #[serde(default)]
    chapters: Vec<Chapter>,
    #[serde(default)]
    credits: Vec<Credit>,
    #[serde(default)]
    pictures: Vec<PictureEntry>,
}

#[derive(Deserialize)]
struct PictureEntry {
    name: String,
    path: PathBuf,
    mime_type: Option<String>,
}

impl LibraryProvider {
    fn manifest_path(&self, title: &str) -> Option<PathBuf> {
        let relative = PathBuf::from(format!("{title}.json"));
        // titles may contain '/' for sub-pages, but must stay inside the library
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        contained.then(|| self.dir.join(relative))
    }

    fn not_found(&self, title: &str) -> ContentError {
        ContentError::NotFound {
            title: title.to_string(),
            lang: self.lang.clone(),
        }
    }

    fn load_picture(&self, base: &Path, entry: &PictureEntry) -> Result<Picture, ContentError> {
        if !entry
            .path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ContentError::Invalid(format!(
                "picture '{}' points outside the library: {}",
                entry.name,
                entry.path.display()
            )));
        }
        let path = base.join(&entry.path);
        let data = std::fs::read(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let mime_type = entry
            .mime_type
            .clone()
            .unwrap_or_else(|| super::mime_from_path(&path).to_string());
        Ok(Picture::new(&entry.name, mime_type, data))
    }
}

impl BookProvider for LibraryProvider {
    fn get(&self, title: &str) -> Result<Book, ContentError> {
        let path = self
            .manifest_path(title)
            .ok_or_else(|| self.not_found(title))?;
        if !path.is_file() {
            return Err(self.not_found(title));
        }
        log::debug!("reading book manifest {}", path.display());

        let contents = std::fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&contents).map_err(|source| ContentError::Manifest {
                path: path.clone(),
                source,
            })?;

        let mut seen = HashSet::new();
        for entry in &manifest.pictures {
            if !seen.insert(entry.name.as_str()) {
                return Err(ContentError::Invalid(format!(
                    "picture '{}' is listed more than once in {}",
                    entry.name,
                    path.display()
                )));
            }
        }

        let mut builder = Book::builder();
        builder
            .title(manifest.title.unwrap_or_else(|| title.to_string()))
            .lang(self.lang.clone())
            .metadata(manifest.metadata)
            .chapters(manifest.chapters)
            .credits(manifest.credits)
            .options(self.options);
        if let Some(cover) = manifest.cover {
            builder.cover(cover);
        }

        // pictures are only worth reading when they will be embedded
        if self.options.images {
            let base = path.parent().unwrap_or(Path::new("."));
            for entry in &manifest.pictures {
                builder.picture(self.load_picture(base, entry)?);
            }
        }

        let book = builder
            .build()
            .map_err(|e| ContentError::Invalid(e.to_string()))?;
        log::debug!(
            "loaded '{}' with {} chapter(s) and {} picture(s)",
            book.title,
            book.chapter_count(),
            book.pictures.len()
        );
        Ok(book)
    }
}
