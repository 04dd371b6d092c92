//! Template configuration.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Options for opening and filling templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    /// Directory for working copies (default: the system temp directory)
    pub temp_dir: Option<PathBuf>,

    /// Replace placeholders without a supplied value with empty text
    pub fill_all_gaps: bool,
}

impl TemplateOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` for temporary files.
    ///
    /// Fails with [`Error::DirectoryNotFound`] if `dir` is not a directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        self.temp_dir = Some(dir);
        Ok(self)
    }

    /// Blank out placeholders that no variable covers.
    pub fn with_fill_all_gaps(mut self, fill: bool) -> Self {
        self.fill_all_gaps = fill;
        self
    }

    /// The configured temp directory, or the system one.
    pub fn resolve_temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::DirectoryNotFound(dir.to_path_buf()))
    }
}
