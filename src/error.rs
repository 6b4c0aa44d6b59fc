//! Error types for the export pipeline.
//!
//! Each stage of an export has its own error type so callers can tell a bad
//! request apart from a missing document, a failed render, or a filesystem
//! problem. `ExportError` is what the orchestrator hands back; `kind()` gives
//! the coarse category for anything that wants to branch on it.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Coarse category of an export failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Content,
    Generation,
    Filesystem,
}

/// Which part of a generator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Conversion,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Render => write!(f, "render"),
            Stage::Conversion => write!(f, "conversion"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("The file format '{0}' is unknown.")]
    UnknownFormat(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Failed to generate '{format}' output during {stage}")]
    Generation {
        format: String,
        stage: Stage,
        #[source]
        source: GenerationError,
    },

    #[error("Unable to create output file: {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidArgument(_) | ExportError::UnknownFormat(_) => {
                ErrorKind::InvalidArgument
            }
            ExportError::Content(_) => ErrorKind::Content,
            ExportError::Generation { .. } => ErrorKind::Generation,
            ExportError::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    /// Wrap a generator failure, tagging it with the format and the stage it came from.
    pub fn generation<S: ToString>(format: S, source: GenerationError) -> ExportError {
        ExportError::Generation {
            format: format.to_string(),
            stage: source.stage(),
            source,
        }
    }
}

/// Failures of the book-model collaborator.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("The document '{title}' does not exist on the '{lang}' library")]
    NotFound { title: String, lang: String },

    #[error("The language '{0}' is not supported")]
    UnsupportedLanguage(String),

    #[error("Failed to parse book manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid book: {0}")]
    Invalid(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures of a single generator run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Conversion to '{0}' is not supported")]
    UnsupportedConversion(String),

    #[error("Unable to create a temporary file in {}", dir.display())]
    TempFile {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:#}")]
    Render(anyhow::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionFailure),
}

impl GenerationError {
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::Conversion(_) | GenerationError::UnsupportedConversion(_) => {
                Stage::Conversion
            }
            GenerationError::TempFile { .. } | GenerationError::Render(_) => Stage::Render,
        }
    }
}

/// Ways the external converter can fail to deliver an artifact.
#[derive(Debug, Error)]
pub enum ConversionFailure {
    #[error("Failed to launch converter '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for converter '{command}'")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("Converter did not finish within {}s and was killed", after.as_secs_f64())]
    TimedOut { after: Duration },

    #[error("Converter reported success but produced no output at {}", path.display())]
    MissingOutput { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_is_invalid_argument() {
        let err = ExportError::UnknownFormat("docx".to_string());
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("'docx'"));
    }

    #[test]
    fn generation_error_names_format_and_stage() {
        let err = ExportError::generation(
            "mobi",
            GenerationError::Conversion(ConversionFailure::TimedOut {
                after: Duration::from_secs(2),
            }),
        );
        assert_eq!(err.kind(), ErrorKind::Generation);
        let message = err.to_string();
        assert!(message.contains("mobi"));
        assert!(message.contains("conversion"));
    }

    #[test]
    fn losing_track_of_the_converter_is_not_a_timeout() {
        let err = GenerationError::Conversion(ConversionFailure::Wait {
            command: "ebook-convert".to_string(),
            source: std::io::Error::other("no child process"),
        });
        assert_eq!(err.stage(), Stage::Conversion);
        assert!(err.to_string().contains("Failed to wait"));
        assert!(!err.to_string().contains("did not finish"));
    }

    #[test]
    fn render_failures_are_render_stage() {
        let err = GenerationError::Render(anyhow::anyhow!("boom"));
        assert_eq!(err.stage(), Stage::Render);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn content_errors_pass_through_verbatim() {
        let content = ContentError::NotFound {
            title: "Hamlet".to_string(),
            lang: "xx".to_string(),
        };
        let expected = content.to_string();
        let err: ExportError = content.into();
        assert_eq!(err.kind(), ErrorKind::Content);
        assert_eq!(err.to_string(), expected);
    }
}
