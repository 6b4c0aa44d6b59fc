//! Mapping format keys onto generators.
//!
//! Each registered key owns a factory closure; resolving a key runs the
//! factory against the configuration captured at registration. Adding a format
//! is a single `register` call.

use super::{ConvertGenerator, EpubGenerator, EpubVersion, Generator, CONVERSION_TARGETS};
use crate::config::Config;
use crate::error::{ExportError, GenerationError};
use std::collections::BTreeMap;

type Factory = Box<dyn Fn() -> Result<Box<dyn Generator>, GenerationError> + Send + Sync>;

pub struct FormatRegistry {
    factories: BTreeMap<String, Factory>,
}

impl FormatRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> FormatRegistry {
        FormatRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// EPUB 2, EPUB 3 (also as plain `epub`) and every conversion target.
    pub fn with_defaults(config: &Config) -> FormatRegistry {
        let mut registry = FormatRegistry::empty();

        let c = config.clone();
        registry.register("epub-2", move || {
            Ok(Box::new(EpubGenerator::new("epub-2", EpubVersion::V2, &c)))
        });
        for key in ["epub-3", "epub"] {
            let c = config.clone();
            registry.register(key, move || {
                Ok(Box::new(EpubGenerator::new(key, EpubVersion::V3, &c)))
            });
        }
        for target in CONVERSION_TARGETS {
            let c = config.clone();
            registry.register(target.format, move || {
                Ok(Box::new(ConvertGenerator::new(target.format, &c)?))
            });
        }

        registry
    }

    /// Register (or replace) the factory for `key`.
    pub fn register<K, F>(&mut self, key: K, factory: F) -> &mut Self
    where
        K: Into<String>,
        F: Fn() -> Result<Box<dyn Generator>, GenerationError> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Box::new(factory));
        self
    }

    /// Exact-match lookup of a format key.
    pub fn resolve(&self, key: &str) -> Result<Box<dyn Generator>, ExportError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| ExportError::UnknownFormat(key.to_string()))?;
        factory().map_err(|e| ExportError::generation(key, e))
    }

    /// Registered keys, sorted.
    pub fn formats(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
