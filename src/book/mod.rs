//! The in-memory book model handed to generators.
//!
//! A `Book` is assembled once per export by a `BookProvider` and is read-only
//! from then on: generators borrow it and never change it. Construction goes
//! through `BookBuilder`, which refuses an empty title or language.

mod chapter;
pub use chapter::*;

mod credit;
pub use credit::*;

mod picture;
pub use picture::*;

mod provider;
pub use provider::*;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Switches that change what ends up in the generated book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Embed pictures; when off, image blocks fall back to their caption.
    pub images: bool,
    /// Include the credits page.
    pub credits: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            images: true,
            credits: true,
        }
    }
}

/// Bibliographic details of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub author: Option<String>,
    pub translator: Option<String>,
    pub illustrator: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub categories: Vec<String>,
}

/// Everything a generator needs to render one document
#[derive(Builder, Debug, Clone)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Book {
    pub title: String,
    /// Language code of the document, e.g. `en` or `fr`
    pub lang: String,
    #[builder(default)]
    pub metadata: Metadata,
    /// Name of the picture to use as the cover, if any
    #[builder(setter(into, strip_option), default)]
    pub cover: Option<String>,
    #[builder(setter(each(name = "chapter", into)), default)]
    pub chapters: Vec<Chapter>,
    /// Pictures keyed by their logical name
    #[builder(setter(custom), default)]
    pub pictures: BTreeMap<String, Picture>,
    #[builder(setter(each(name = "credit", into)), default)]
    pub credits: Vec<Credit>,
    #[builder(default)]
    pub options: GenerationOptions,
}

impl BookBuilder {
    /// Add a picture, keyed by its name.
    pub fn picture(&mut self, picture: Picture) -> &mut Self {
        self.pictures
            .get_or_insert_with(BTreeMap::new)
            .insert(picture.name.clone(), picture);
        self
    }

    fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) if !title.trim().is_empty() => {}
            _ => return Err("a book needs a title".to_string()),
        }
        match &self.lang {
            Some(lang) if !lang.trim().is_empty() => {}
            _ => return Err("a book needs a language".to_string()),
        }
        Ok(())
    }
}

impl Book {
    pub fn builder() -> BookBuilder {
        BookBuilder::default()
    }

    pub fn picture(&self, name: &str) -> Option<&Picture> {
        self.pictures.get(name)
    }

    /// The cover picture, when one is named and present.
    pub fn cover_picture(&self) -> Option<&Picture> {
        self.cover.as_deref().and_then(|name| self.picture(name))
    }

    /// Number of chapters in the whole tree, nested ones included.
    pub fn chapter_count(&self) -> usize {
        self.chapters.iter().map(Chapter::count).sum()
    }

    /// Everyone credited as an author, translator or illustrator, in that order.
    pub fn contributors(&self) -> Vec<&str> {
        [
            &self.metadata.author,
            &self.metadata.translator,
            &self.metadata.illustrator,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect()
    }
}
