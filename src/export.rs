//! The export pipeline: resolve the format, fetch the book, generate, place.
//!
//! Every step runs once; the first failure ends the export and nothing is
//! retried. An `Exporter` holds no mutable state, so one instance can serve
//! concurrent exports from several threads.

use crate::book::{GenerationOptions, ProviderFactory};
use crate::error::ExportError;
use crate::generator::FormatRegistry;
use crate::output::OutputPlacer;
use derive_builder::Builder;
use std::path::{Path, PathBuf};

/// What the caller wants exported.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "ExportError"))]
pub struct ExportRequest {
    pub title: String,
    pub lang: String,
    #[builder(default = "\"epub\".to_string()")]
    pub format: String,
    /// Directory the output file is written to
    #[builder(default = "PathBuf::from(\".\")")]
    pub path: PathBuf,
    #[builder(default)]
    pub options: GenerationOptions,
}

impl ExportRequestBuilder {
    fn validate(&self) -> Result<(), ExportError> {
        let missing = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
        if missing(&self.title) {
            return Err(ExportError::InvalidArgument("A title is required.".to_string()));
        }
        if missing(&self.lang) {
            return Err(ExportError::InvalidArgument("A language is required.".to_string()));
        }
        if let Some(title) = &self.title {
            if !OutputPlacer::is_contained(title) {
                return Err(ExportError::InvalidArgument(format!(
                    "The title '{title}' is not a valid file name."
                )));
            }
        }
        Ok(())
    }
}

impl From<derive_builder::UninitializedFieldError> for ExportError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        ExportError::InvalidArgument(format!("The {} is required.", e.field_name()))
    }
}

impl ExportRequest {
    pub fn builder() -> ExportRequestBuilder {
        ExportRequestBuilder::default()
    }
}

/// A successfully exported book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub path: PathBuf,
    pub format: String,
    pub mime_type: String,
    pub size: u64,
}

pub struct Exporter {
    registry: FormatRegistry,
    books: Box<dyn ProviderFactory>,
    placer: OutputPlacer,
}

impl Exporter {
    pub fn new<F: ProviderFactory + 'static>(registry: FormatRegistry, books: F) -> Exporter {
        Exporter {
            registry,
            books: Box::new(books),
            placer: OutputPlacer::new(),
        }
    }

    pub fn export(&self, request: &ExportRequest) -> Result<ExportResult, ExportError> {
        let generator = self.registry.resolve(&request.format)?;
        log::info!(
            "exporting '{}' ({}) as {}",
            request.title,
            request.lang,
            generator.format()
        );

        let book = self
            .books
            .provider(&request.lang, &request.options)?
            .get(&request.title)?;

        let temp = generator
            .create(&book)
            .map_err(|e| ExportError::generation(generator.format(), e))?;
        drop(book);

        let path = self
            .placer
            .place(temp, &request.path, &request.title, generator.extension())?;
        let size = output_size(&path);

        log::info!("wrote {}", path.display());
        Ok(ExportResult {
            path,
            format: generator.format().to_string(),
            mime_type: generator.mime_type().to_string(),
            size,
        })
    }
}

/// Size of a placed output file. The file is already in place, so failing to
/// stat it is only worth a warning and reports 0.
fn output_size(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            log::warn!("failed to read the size of {}: {e}", path.display());
            0
        }
    }
}
