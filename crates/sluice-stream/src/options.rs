use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Handle construction settings.
///
/// Built with the builder methods or loaded from TOML:
///
/// ```toml
/// buffer_capacity = 65536
/// flush_each_write = true
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    buffer_capacity:  usize,
    flush_each_write: bool,
}

impl Default for Options {
    fn default() -> Self { Self::new() }
}

impl Options {
    pub fn new() -> Self {
        Self {
            buffer_capacity:  DEFAULT_BUFFER_CAPACITY,
            flush_each_write: false,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> { Ok(toml::from_str(source)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io {
            resource: path.display().to_string(),
            source:   e,
        })?;
        Self::from_toml_str(&source)
    }

    /// Zero is clamped to one byte.
    pub fn buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes.max(1);
        self
    }

    pub fn flush_each_write(mut self, flush: bool) -> Self {
        self.flush_each_write = flush;
        self
    }

    pub fn get_buffer_capacity(&self) -> usize { self.buffer_capacity.max(1) }

    pub fn get_flush_each_write(&self) -> bool { self.flush_each_write }
}
