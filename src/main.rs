use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use ws_book::book::{GenerationOptions, Library};
use ws_book::config::Config;
use ws_book::error::{ErrorKind, ExportError};
use ws_book::export::{ExportRequest, Exporter};
use ws_book::generator::FormatRegistry;

mod cli;
mod logging;

fn main() -> ExitCode {
    use clap::Parser;
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.debug) {
        eprintln!("{}: {e:#}", console::style("Warning").yellow());
    }

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ExportError>() {
                Some(export) if export.kind() == ErrorKind::InvalidArgument => {
                    eprintln!("{export}\n");
                    eprint!("{}", cli::help());
                }
                _ => eprintln!("{}: {e:#}", console::style("Error").red()),
            }
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(tmpdir) = &cli.tmpdir {
        config.set_temp_dir(tmpdir)?;
    }
    if let Some(library) = &cli.library {
        config.library = library.clone();
    }

    let registry = FormatRegistry::with_defaults(&config);
    if cli.list_formats {
        for format in registry.formats() {
            println!("{format}");
        }
        return Ok(());
    }

    let mut request = ExportRequest::builder();
    if let Some(title) = &cli.title {
        request.title(title);
    }
    if let Some(lang) = &cli.lang {
        request.lang(lang);
    }
    let request = request
        .format(&cli.format)
        .path(&cli.path)
        .options(GenerationOptions {
            images: !cli.noimages,
            credits: !cli.nocredits,
        })
        .build()?;

    let progress = if cli.debug {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("can parse progress style"),
    );
    progress.set_message(format!("Exporting {} as {}...", request.title, request.format));
    progress.enable_steady_tick(Duration::from_millis(120));

    let exporter = Exporter::new(registry, Library::new(&config.library));
    let result = exporter.export(&request);
    progress.finish_and_clear();
    let result = result
        .with_context(|| format!("Failed to export '{}' ({})", request.title, request.lang))?;

    log::info!(
        "{} ({} as {}, {:.2})",
        result.path.display(),
        result.format,
        result.mime_type,
        Byte::from_u64(result.size).get_appropriate_unit(UnitType::Binary)
    );
    println!("The ebook has been created: {}", result.path.display());
    Ok(())
}
