use serde::{Deserialize, Serialize};

/// A single piece of chapter content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        #[serde(default = "default_heading_level")]
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Image {
        /// Name of a picture in the book
        picture: String,
        #[serde(default)]
        caption: Option<String>,
    },
    Preformatted {
        text: String,
    },
}

fn default_heading_level() -> u8 {
    2
}

impl Block {
    pub fn paragraph<S: ToString>(text: S) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }
}

/// A chapter with its content and any sub-chapters, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Chapter {
    pub fn new<S: ToString>(title: S) -> Chapter {
        Chapter {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_block(mut self, block: Block) -> Chapter {
        self.blocks.push(block);
        self
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Chapter {
        self.chapters.push(chapter);
        self
    }

    /// This chapter plus all of its descendants.
    pub fn count(&self) -> usize {
        1 + self.chapters.iter().map(Chapter::count).sum::<usize>()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_deserialize_blocks() {
        let chapter: Chapter = serde_json::from_str(
            r#"{
                "title": "Act I",
                "blocks": [
                    {"type": "heading", "text": "Scene I"},
                    {"type": "paragraph", "text": "Who's there?"},
                    {"type": "image", "picture": "ghost.png"}
                ]
            }"#,
        )
        .expect("can parse chapter");

        assert_eq!(
            chapter.blocks[0],
            Block::Heading {
                level: 2,
                text: "Scene I".to_string()
            }
        );
        assert_eq!(chapter.blocks[1], Block::paragraph("Who's there?"));
        assert_eq!(
            chapter.blocks[2],
            Block::Image {
                picture: "ghost.png".to_string(),
                caption: None
            }
        );
        assert!(chapter.chapters.is_empty());
    }
}
