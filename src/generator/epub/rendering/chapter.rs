//! Chapter rendering for EPUB.
//!
//! The chapter tree is flattened depth first, so a chapter is always followed
//! by its sub-chapters; each entry remembers its depth so the table of
//! contents can nest it again. Image blocks only produce an `<img>` when
//! pictures are embedded, otherwise the caption stands in for them.

use super::super::EpubVersion;
use crate::book::{Block, Book, Chapter};

/// A chapter together with how deep it sits in the tree.
pub struct FlatChapter<'b> {
    pub chapter: &'b Chapter,
    pub depth: usize,
}

/// Flatten the chapter tree in reading order.
pub fn flatten(chapters: &[Chapter]) -> Vec<FlatChapter<'_>> {
    fn walk<'b>(chapters: &'b [Chapter], depth: usize, out: &mut Vec<FlatChapter<'b>>) {
        for chapter in chapters {
            out.push(FlatChapter { chapter, depth });
            walk(&chapter.chapters, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(chapters, 0, &mut out);
    out
}

/// Render a single chapter (without its sub-chapters) as XHTML.
pub fn render(book: &Book, entry: &FlatChapter<'_>, version: EpubVersion) -> String {
    let heading = (entry.depth + 1).min(6);
    let mut body = format!(
        "<h{heading}>{}</h{heading}>\n",
        html_escape::encode_text(&entry.chapter.title)
    );

    for block in &entry.chapter.blocks {
        body.push_str(&render_block(book, block));
        body.push('\n');
    }

    super::page(version, &book.lang, &entry.chapter.title, &body)
}

fn render_block(book: &Book, block: &Block) -> String {
    match block {
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            format!("<h{level}>{}</h{level}>", html_escape::encode_text(text))
        }
        Block::Paragraph { text } => format!("<p>{}</p>", html_escape::encode_text(text)),
        Block::Preformatted { text } => {
            format!("<pre>{}</pre>", html_escape::encode_text(text))
        }
        Block::Image { picture, caption } => {
            let href = book
                .picture(picture)
                .filter(|_| book.options.images)
                .and_then(|p| super::picture_href(book, &p.name));
            match (href, caption) {
                (Some(href), caption) => {
                    let alt = caption.as_deref().unwrap_or(picture.as_str());
                    let caption_html = caption
                        .as_deref()
                        .map(|c| format!(r#"<p class="caption">{}</p>"#, html_escape::encode_text(c)))
                        .unwrap_or_default();
                    format!(
                        r#"<div class="picture"><img src="{}" alt="{}"/>{}</div>"#,
                        html_escape::encode_double_quoted_attribute(&href),
                        html_escape::encode_double_quoted_attribute(alt),
                        caption_html,
                    )
                }
                (None, Some(caption)) => {
                    format!(r#"<p class="caption">{}</p>"#, html_escape::encode_text(caption))
                }
                (None, None) => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support::hamlet;

    #[test]
    fn can_flatten_depth_first() {
        let chapters = vec![
            Chapter::new("1").with_chapter(Chapter::new("1.1").with_chapter(Chapter::new("1.1.1"))),
            Chapter::new("2"),
        ];
        let flat = flatten(&chapters);
        let titles: Vec<(&str, usize)> = flat
            .iter()
            .map(|e| (e.chapter.title.as_str(), e.depth))
            .collect();
        assert_eq!(titles, vec![("1", 0), ("1.1", 1), ("1.1.1", 2), ("2", 0)]);
    }

    #[test]
    fn can_render_blocks() {
        let book = hamlet();
        let chapter = Chapter::new("Act <III>")
            .with_block(Block::Heading {
                level: 9,
                text: "Scene I".to_string(),
            })
            .with_block(Block::paragraph("To be & not to be"))
            .with_block(Block::Preformatted {
                text: "  verse".to_string(),
            });
        let html = render(
            &book,
            &FlatChapter {
                chapter: &chapter,
                depth: 1,
            },
            EpubVersion::V3,
        );

        assert!(html.contains("<h2>Act &lt;III&gt;</h2>"));
        assert!(html.contains("<h6>Scene I</h6>"));
        assert!(html.contains("<p>To be &amp; not to be</p>"));
        assert!(html.contains("<pre>  verse</pre>"));
    }

    #[test]
    fn missing_pictures_fall_back_to_caption() {
        let book = hamlet();
        let embedded = render_block(
            &book,
            &Block::Image {
                picture: "skull.png".to_string(),
                caption: None,
            },
        );
        assert!(embedded.contains(r#"src="images/picture-0000.png""#));
        assert!(embedded.contains(r#"alt="skull.png""#));

        let missing = render_block(
            &book,
            &Block::Image {
                picture: "ghost.png".to_string(),
                caption: Some("The ghost".to_string()),
            },
        );
        assert_eq!(missing, r#"<p class="caption">The ghost</p>"#);
    }
}
