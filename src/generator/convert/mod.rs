//! Formats reached through an external converter.
//!
//! The book is first rendered as EPUB 3 into the temporary directory, then
//! handed to an `ebook-convert` compatible tool which writes the target
//! format. The intermediate EPUB is always removed once the converter is done
//! with it, whether it succeeded or not.

mod process;
pub use process::*;

use super::{temp_file, EpubGenerator, EpubVersion, Generator};
use crate::book::Book;
use crate::config::Config;
use crate::error::GenerationError;
use tempfile::TempPath;

/// A format the converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionTarget {
    pub format: &'static str,
    pub extension: &'static str,
    pub mime_type: &'static str,
    /// Extra converter arguments, whitespace separated
    pub parameters: &'static str,
}

impl ConversionTarget {
    /// Look up a target by its format key.
    pub fn find(format: &str) -> Option<&'static ConversionTarget> {
        CONVERSION_TARGETS.iter().find(|t| t.format == format)
    }

    pub fn parameters(&self) -> Vec<&'static str> {
        self.parameters.split_whitespace().collect()
    }
}

const PDF_PARAMETERS: &str = "--margin-bottom 48 --margin-top 60 --margin-left 36 --margin-right 36 --pdf-page-numbers --preserve-cover-aspect-ratio";

/// Every format the converter is trusted to produce.
pub static CONVERSION_TARGETS: &[ConversionTarget] = &[
    ConversionTarget {
        format: "htmlz",
        extension: "htmlz",
        mime_type: "application/zip",
        parameters: "",
    },
    ConversionTarget {
        format: "mobi",
        extension: "mobi",
        mime_type: "application/x-mobipocket-ebook",
        parameters: "--output-profile kindle_oasis --mobi-file-type both",
    },
    ConversionTarget {
        format: "pdf-a4",
        extension: "a4.pdf",
        mime_type: "application/pdf",
        parameters: "--paper-size a4",
    },
    ConversionTarget {
        format: "pdf-a5",
        extension: "a5.pdf",
        mime_type: "application/pdf",
        parameters: "--paper-size a5",
    },
    ConversionTarget {
        format: "pdf-a6",
        extension: "a6.pdf",
        mime_type: "application/pdf",
        parameters: "--paper-size a6",
    },
    ConversionTarget {
        format: "pdf-letter",
        extension: "letter.pdf",
        mime_type: "application/pdf",
        parameters: "--paper-size letter",
    },
    ConversionTarget {
        format: "rtf",
        extension: "rtf",
        mime_type: "application/rtf",
        parameters: "",
    },
    ConversionTarget {
        format: "txt",
        extension: "txt",
        mime_type: "text/plain",
        parameters: "--txt-output-encoding=utf-8 --txt-output-formatting=plain",
    },
];

/// Renders EPUB 3 and converts it into one of `CONVERSION_TARGETS`.
#[derive(Debug, Clone)]
pub struct ConvertGenerator {
    target: &'static ConversionTarget,
    epub: EpubGenerator,
    converter: Converter,
    temp_dir: std::path::PathBuf,
}

impl ConvertGenerator {
    /// Fails straight away when `format` isn't a known conversion target.
    pub fn new(format: &str, config: &Config) -> Result<ConvertGenerator, GenerationError> {
        let target = ConversionTarget::find(format)
            .ok_or_else(|| GenerationError::UnsupportedConversion(format.to_string()))?;

        Ok(ConvertGenerator {
            target,
            epub: EpubGenerator::new("epub-3", EpubVersion::V3, config),
            converter: Converter::new(&config.convert),
            temp_dir: config.temp_dir.clone(),
        })
    }

    fn parameters(&self) -> Vec<&'static str> {
        let mut parameters = self.target.parameters();
        if self.target.mime_type == "application/pdf" {
            parameters.extend(PDF_PARAMETERS.split_whitespace());
        }
        parameters
    }
}

impl Generator for ConvertGenerator {
    fn format(&self) -> &str {
        self.target.format
    }

    fn extension(&self) -> &str {
        self.target.extension
    }

    fn mime_type(&self) -> &str {
        self.target.mime_type
    }

    fn create(&self, book: &Book) -> Result<TempPath, GenerationError> {
        let intermediate = self.epub.create(book)?;
        let output = temp_file(&self.temp_dir, self.extension())?.into_temp_path();

        let outcome = self
            .converter
            .run(&intermediate, &output, &self.parameters());
        // the converter is done with the EPUB either way
        if let Err(e) = intermediate.close() {
            log::warn!("failed to remove intermediate EPUB: {e}");
        }

        // `output` is dropped, and so deleted, on every error path
        outcome?.into_result()?;
        log::debug!(
            "converted '{}' to {} at {}",
            book.title,
            self.target.format,
            output.display()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertConfig;
    use crate::error::{ConversionFailure, Stage};
    use crate::generator::test_support::{hamlet, leftovers};

    #[test]
    fn unknown_targets_fail_fast() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let config = Config {
            temp_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = ConvertGenerator::new("docx", &config).unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedConversion(ref f) if f == "docx"));
        assert_eq!(err.stage(), Stage::Conversion);
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn targets_are_unique() {
        let mut formats: Vec<_> = CONVERSION_TARGETS.iter().map(|t| t.format).collect();
        formats.sort();
        formats.dedup();
        assert_eq!(formats.len(), CONVERSION_TARGETS.len());
        assert!(ConversionTarget::find("mobi").is_some());
        assert!(ConversionTarget::find("epub").is_none());
    }

    #[test]
    fn pdf_targets_get_page_layout_parameters() {
        let generator = ConvertGenerator::new("pdf-a5", &Config::default()).expect("pdf-a5 exists");
        let parameters = generator.parameters();
        assert_eq!(&parameters[..2], &["--paper-size", "a5"]);
        assert!(parameters.contains(&"--pdf-page-numbers"));
        assert_eq!(generator.extension(), "a5.pdf");
    }

    #[cfg(unix)]
    fn config_with(dir: &std::path::Path, script: &str, timeout_secs: u64) -> Config {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).expect("can create bin dir");
        let scratch = dir.join("tmp");
        std::fs::create_dir_all(&scratch).expect("can create scratch dir");
        let command = crate::generator::test_support::fake_converter(&bin, script);
        Config {
            temp_dir: scratch,
            convert: ConvertConfig {
                command: command.display().to_string(),
                timeout_secs,
            },
            ..Default::default()
        }
    }

    #[cfg(unix)]
    #[test]
    fn converts_and_removes_intermediate() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let config = config_with(dir.path(), r#"cp "$1" "$2""#, 10);
        let generator = ConvertGenerator::new("txt", &config).expect("txt exists");

        let output = generator.create(&hamlet()).expect("can convert");
        assert!(output.to_string_lossy().ends_with(".txt"));
        assert!(std::fs::metadata(&output).expect("output exists").len() > 0);
        assert_eq!(leftovers(&config.temp_dir).len(), 1);

        drop(output);
        assert!(leftovers(&config.temp_dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failed_conversion_leaves_nothing_behind() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let config = config_with(dir.path(), "exit 1", 10);
        let generator = ConvertGenerator::new("mobi", &config).expect("mobi exists");

        let err = generator.create(&hamlet()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Conversion(ConversionFailure::Exit { .. })
        ));
        assert_eq!(err.stage(), Stage::Conversion);
        assert!(leftovers(&config.temp_dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn empty_output_is_a_failure() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let config = config_with(dir.path(), "exit 0", 10);
        let generator = ConvertGenerator::new("rtf", &config).expect("rtf exists");

        let err = generator.create(&hamlet()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Conversion(ConversionFailure::MissingOutput { .. })
        ));
        assert!(leftovers(&config.temp_dir).is_empty());
    }
}
