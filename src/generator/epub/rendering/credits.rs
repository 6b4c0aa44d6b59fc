//! Credits page rendering for EPUB.
//!
//! Lists the document's named contributors followed by everyone who worked on
//! the transcription, most active first, and closes with the generation date.

use super::super::EpubVersion;
use crate::book::{Book, Credit};

/// Render the credits page as XHTML.
pub fn render(book: &Book, version: EpubVersion) -> String {
    let mut body = String::from("<div class=\"credits\">\n<h2>Credits</h2>\n");

    let contributors = book.contributors();
    if !contributors.is_empty() {
        body.push_str(&format!(
            "<p>{}</p>\n",
            html_escape::encode_text(&contributors.join(", "))
        ));
    }

    // sort by contribution count, keeping manifest order for ties
    let mut credits: Vec<&Credit> = book.credits.iter().collect();
    credits.sort_by(|a, b| b.count.cmp(&a.count));
    if !credits.is_empty() {
        body.push_str("<ul>\n");
        for credit in credits {
            body.push_str(&format!(
                "<li>{}</li>\n",
                html_escape::encode_text(&credit.to_string())
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str(&format!(
        "<hr/>\n<p class=\"generated\">Generated on {} by ws-book v{}</p>\n</div>",
        chrono::Utc::now().format("%Y-%m-%d"),
        env!("CARGO_PKG_VERSION"),
    ));

    super::page(version, &book.lang, "Credits", &body)
}
