//! Title page rendering for EPUB.
//!
//! Shows the cover picture (when embedded), the title, the people credited on
//! the document, and the publisher line.

use super::super::EpubVersion;
use crate::book::Book;

/// Render the title page as XHTML.
pub fn render(book: &Book, version: EpubVersion) -> String {
    let mut body = String::from("<div class=\"title-page\">\n");

    let cover = book
        .cover_picture()
        .filter(|_| book.options.images)
        .and_then(|cover| super::picture_href(book, &cover.name));
    if let Some(href) = cover {
        body.push_str(&format!(
            "<div class=\"cover\"><img src=\"{}\" alt=\"{}\"/></div>\n",
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_double_quoted_attribute(&book.title),
        ));
    }

    body.push_str(&format!(
        "<h1>{}</h1>\n",
        html_escape::encode_text(&book.title)
    ));

    let metadata = &book.metadata;
    if let Some(author) = &metadata.author {
        body.push_str(&format!(
            "<p class=\"author\">{}</p>\n",
            html_escape::encode_text(author)
        ));
    }
    if let Some(translator) = &metadata.translator {
        body.push_str(&format!(
            "<p class=\"contributor\">Translated by {}</p>\n",
            html_escape::encode_text(translator)
        ));
    }
    if let Some(illustrator) = &metadata.illustrator {
        body.push_str(&format!(
            "<p class=\"contributor\">Illustrated by {}</p>\n",
            html_escape::encode_text(illustrator)
        ));
    }

    let publication = [&metadata.publisher, &metadata.year]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if !publication.is_empty() {
        body.push_str(&format!(
            "<p class=\"publisher\">{}</p>\n",
            html_escape::encode_text(&publication)
        ));
    }

    body.push_str("</div>");
    super::page(version, &book.lang, &book.title, &body)
}
