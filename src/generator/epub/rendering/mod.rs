//! XHTML documents that make up an EPUB package.
//!
//! EPUB 2 content documents are XHTML 1.1; EPUB 3 ones are XHTML5 with the
//! `epub` namespace declared. `page` wraps a rendered body in the right
//! skeleton for the version being generated.

pub mod chapter;
pub mod credits;
pub mod title_page;

use super::EpubVersion;
use crate::book::Book;

/// Location of a picture inside the package, relative to the content documents.
///
/// Wiki file names may hold spaces, `#` or slashes, none of which belong in a
/// package path, so pictures are stored under their position in the book.
pub fn picture_href(book: &Book, name: &str) -> Option<String> {
    book.pictures
        .values()
        .enumerate()
        .find(|(_, picture)| picture.name == name)
        .map(|(index, picture)| format!("images/picture-{index:04}.{}", picture.extension()))
}

/// Wrap `body` in a complete XHTML document.
pub fn page(version: EpubVersion, lang: &str, title: &str, body: &str) -> String {
    let lang = html_escape::encode_double_quoted_attribute(lang);
    let title = html_escape::encode_text(title);
    match version {
        EpubVersion::V2 => format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="stylesheet.css"/>
</head>
<body>
{body}
</body>
</html>"#
        ),
        EpubVersion::V3 => format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
    <meta charset="UTF-8"/>
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="stylesheet.css"/>
</head>
<body>
{body}
</body>
</html>"#
        ),
    }
}
