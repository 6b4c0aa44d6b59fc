use clap::Parser;
use std::path::PathBuf;

/// Export a wiki document as an e-book
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Language code of the document, e.g. "en" or "fr"
    #[clap(short, long)]
    pub lang: Option<String>,

    /// Title of the document to export
    #[clap(short, long)]
    pub title: Option<String>,

    /// Output format: epub, epub-2, epub-3 or any converter format (see --list-formats)
    #[clap(short, long, default_value = "epub")]
    pub format: String,

    /// Directory the e-book is written to
    #[clap(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Print debugging output
    #[clap(short, long)]
    pub debug: bool,

    /// Directory for temporary files; must already exist
    #[clap(long)]
    pub tmpdir: Option<PathBuf>,

    /// Leave out the credits page
    #[clap(long)]
    pub nocredits: bool,

    /// Don't embed pictures
    #[clap(long)]
    pub noimages: bool,

    /// Configuration file
    #[clap(long, default_value = ws_book::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding the book library, overriding the configuration
    #[clap(long, env = "WS_BOOK_LIBRARY")]
    pub library: Option<PathBuf>,

    /// List the supported output formats and exit
    #[clap(long)]
    pub list_formats: bool,
}

/// Usage help for the command line, printed alongside argument errors.
pub fn help() -> String {
    use clap::CommandFactory;
    Cli::command().render_help().to_string()
}
