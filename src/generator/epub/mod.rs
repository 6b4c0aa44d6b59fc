//! Native EPUB generation.
//!
//! Books are packaged with the `epub-builder` crate, which takes care of the
//! OPF manifest, NCX / nav navigation and the ZIP layout with the proper MIME
//! type entry. Every chapter becomes its own XHTML document; nested chapters
//! become nested table of contents entries.

mod rendering;
mod styles;

use super::{temp_file, Generator};
use crate::book::Book;
use crate::config::Config;
use crate::error::GenerationError;
use anyhow::{anyhow, Context, Result};
use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};
use std::fmt::Display;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tempfile::TempPath;

/// `epub-builder` reports failures as `eyre::Report`, which doesn't implement
/// `std::error::Error` and so can't take `anyhow` context directly.
trait EpubContext<T> {
    fn epub_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T> EpubContext<T> for eyre::Result<T> {
    fn epub_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| anyhow!("{}: {e:#}", f()))
    }
}

/// EPUB package version to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpubVersion {
    V2,
    V3,
}

impl EpubVersion {
    fn builder_version(self) -> epub_builder::EpubVersion {
        match self {
            EpubVersion::V2 => epub_builder::EpubVersion::V20,
            EpubVersion::V3 => epub_builder::EpubVersion::V30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EpubGenerator {
    version: EpubVersion,
    format: String,
    temp_dir: PathBuf,
}

impl EpubGenerator {
    pub fn new<S: ToString>(format: S, version: EpubVersion, config: &Config) -> EpubGenerator {
        EpubGenerator {
            version,
            format: format.to_string(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Render the book as an EPUB package into `writer`.
    ///
    /// Returns the number of XHTML documents in the package.
    pub fn render<W: Write>(&self, book: &Book, writer: W) -> Result<usize> {
        let zip = ZipLibrary::new().epub_context(|| "Failed to create ZIP library for EPUB")?;
        let mut builder = EpubBuilder::new(zip).epub_context(|| "Failed to build builder")?;
        builder.epub_version(self.version.builder_version());

        // set metadata
        builder
            .metadata("title", &book.title)
            .epub_context(|| "Failed to set title metadata")?;
        builder
            .metadata("generator", "ws-book")
            .epub_context(|| "Failed to set generator metadata")?;
        builder
            .metadata("lang", &book.lang)
            .epub_context(|| "Failed to set language metadata")?;
        for author in book.contributors() {
            builder
                .metadata("author", author)
                .epub_context(|| format!("Failed to add author metadata for author: {author}"))?;
        }
        if !book.metadata.categories.is_empty() {
            builder
                .metadata("subject", book.metadata.categories.join(", "))
                .epub_context(|| "Failed to set subject metadata")?;
        }

        builder
            .stylesheet(styles::STYLESHEET.as_bytes())
            .epub_context(|| "Failed to add stylesheet")?;

        let images = book.options.images;
        let cover = book.cover_picture().filter(|_| images);
        if let Some(cover) = cover {
            let href = rendering::picture_href(book, &cover.name)
                .ok_or_else(|| anyhow!("Cover picture is not part of the book: {}", cover.name))?;
            builder
                .add_cover_image(href, cover.data.as_slice(), cover.mime_type.as_str())
                .epub_context(|| format!("Failed to add cover image: {}", cover.name))?;
        } else if let Some(name) = &book.cover {
            if images {
                log::warn!("cover picture '{name}' is missing from '{}'", book.title);
            }
        }

        if images {
            for picture in book.pictures.values() {
                if cover.is_some_and(|c| c.name == picture.name) {
                    continue;
                }
                let href = rendering::picture_href(book, &picture.name)
                    .ok_or_else(|| anyhow!("Picture is not part of the book: {}", picture.name))?;
                builder
                    .add_resource(href, picture.data.as_slice(), picture.mime_type.as_str())
                    .epub_context(|| format!("Failed to add picture: {}", picture.name))?;
            }
        }

        let mut document_count = 0;

        // title page
        let title_html = rendering::title_page::render(book, self.version);
        builder
            .add_content(
                EpubContent::new("title.xhtml", title_html.as_bytes())
                    .title(&book.title)
                    .reftype(ReferenceType::TitlePage),
            )
            .epub_context(|| "Failed to add title page")?;
        document_count += 1;

        builder.inline_toc();

        // chapters, depth first so nested entries follow their parent
        let chapters = rendering::chapter::flatten(&book.chapters);
        for (i, entry) in chapters.iter().enumerate() {
            let filename = format!("chapter-{i:04}.xhtml");
            let html = rendering::chapter::render(book, entry, self.version);
            let mut content = EpubContent::new(&filename, html.as_bytes())
                .title(&entry.chapter.title)
                .level(entry.depth as i32 + 1);
            if i == 0 {
                content = content.reftype(ReferenceType::Text);
            }
            builder.add_content(content).epub_context(|| {
                format!("Failed to add chapter to EPUB: {}", entry.chapter.title)
            })?;
            document_count += 1;
        }

        if book.options.credits {
            let credits_html = rendering::credits::render(book, self.version);
            builder
                .add_content(
                    EpubContent::new("credits.xhtml", credits_html.as_bytes())
                        .title("Credits")
                        .reftype(ReferenceType::Colophon),
                )
                .epub_context(|| "Failed to add credits page")?;
            document_count += 1;
        }

        builder
            .generate(writer)
            .epub_context(|| "Failed to generate EPUB file")?;

        Ok(document_count)
    }
}

impl Generator for EpubGenerator {
    fn format(&self) -> &str {
        &self.format
    }

    fn extension(&self) -> &str {
        "epub"
    }

    fn mime_type(&self) -> &str {
        "application/epub+zip"
    }

    fn create(&self, book: &Book) -> Result<TempPath, GenerationError> {
        let mut file = temp_file(&self.temp_dir, self.extension())?;

        let mut writer = BufWriter::new(&mut file);
        let document_count = self
            .render(book, &mut writer)
            .and_then(|count| {
                writer
                    .flush()
                    .with_context(|| "Failed to flush EPUB file")?;
                Ok(count)
            })
            .map_err(GenerationError::Render)?;
        drop(writer);

        log::debug!(
            "rendered '{}' as {:?} with {document_count} document(s) into {}",
            book.title,
            self.version,
            file.path().display()
        );
        Ok(file.into_temp_path())
    }
}
