//! Export wiki documents as e-books.
//!
//! A request names a document by title and language plus an output format.
//! The pipeline resolves the format to a [`generator::Generator`], asks a
//! [`book::BookProvider`] for the document, renders it into a temporary file
//! and finally moves that file into the destination directory in one rename.
//!
//! ```no_run
//! use ws_book::book::Library;
//! use ws_book::config::Config;
//! use ws_book::export::{ExportRequest, Exporter};
//! use ws_book::generator::FormatRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let exporter = Exporter::new(FormatRegistry::with_defaults(&config), Library::new("library"));
//! let request = ExportRequest::builder()
//!     .title("Hamlet")
//!     .lang("en")
//!     .format("epub-3")
//!     .path("out")
//!     .build()?;
//! let result = exporter.export(&request)?;
//! println!("{}", result.path.display());
//! # Ok(())
//! # }
//! ```

pub mod book;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod output;
