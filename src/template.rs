//! Placeholder substitution on a Word template.

use crate::container::DocxContainer;
use crate::error::{Error, Result};
use crate::options::{ensure_dir, TemplateOptions};
use crate::part::Part;
use crate::placeholder::{clean_placeholders, placeholder_keys, Substitution};
use crate::variables::Variables;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An opened Word template.
///
/// The template is worked on through a private copy; the source file is
/// never modified. Part text is loaded lazily, cleaned so that placeholders
/// split across runs become matchable, and cached for the rest of the
/// session. [`save`](Self::save) writes the result and consumes the template.
///
/// Dropping a template without saving discards the working copy.
///
/// # Example
///
/// ```no_run
/// use docx_template::{DocxTemplate, Variables};
///
/// let vars: Variables = [("name", "Alice"), ("date", "1 May")].into_iter().collect();
///
/// let mut template = DocxTemplate::open("letter.docx")?;
/// template.set_data(&vars, true)?;
/// template.save("letter-alice.docx")?;
/// # Ok::<(), docx_template::Error>(())
/// ```
#[derive(Debug)]
pub struct DocxTemplate {
    container: DocxContainer,
    /// Cleaned or written text per part, authoritative once present
    parts: HashMap<Part, String>,
    temp_dir: PathBuf,
}

impl DocxTemplate {
    /// Open a template using the system temp directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &TemplateOptions::default())
    }

    /// Open a template with options.
    pub fn open_with_options(path: impl AsRef<Path>, options: &TemplateOptions) -> Result<Self> {
        let temp_dir = options.resolve_temp_dir();
        let container = DocxContainer::open(path, &temp_dir)?;
        Ok(Self {
            container,
            parts: HashMap::new(),
            temp_dir,
        })
    }

    /// Directory used for temporary files.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Stage the finished document in `dir` when saving.
    pub fn set_temp_dir(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        self.temp_dir = dir;
        Ok(self)
    }

    /// Current text of a part.
    ///
    /// The first call reads the part from the archive and cleans its
    /// placeholders; later calls return the cached text. A part missing from
    /// the archive is empty.
    pub fn get_part(&mut self, part: Part) -> Result<&str> {
        if !self.parts.contains_key(&part) {
            let raw = self.container.read_xml(part.entry_path())?;
            if raw.is_none() {
                tracing::debug!("{} not present, using empty part", part.entry_path());
            }
            let cleaned = clean_placeholders(&raw.unwrap_or_default());
            self.parts.insert(part, cleaned);
        } else {
            tracing::trace!("{} served from cache", part);
        }
        Ok(self.parts.get(&part).map(String::as_str).unwrap_or_default())
    }

    /// Replace the text of a part.
    ///
    /// Non-empty text is written to the archive. Empty text only updates the
    /// cache; the archive entry keeps its previous content.
    pub fn set_part(&mut self, part: Part, contents: impl Into<String>) -> Result<&mut Self> {
        let contents = contents.into();
        if !contents.is_empty() {
            self.container
                .write_entry(part.entry_path(), contents.as_bytes());
        }
        self.parts.insert(part, contents);
        Ok(self)
    }

    /// Apply a substitution to one part and store the result.
    pub fn fill_part(&mut self, part: Part, substitution: &Substitution) -> Result<&mut Self> {
        let filled = substitution.apply(self.get_part(part)?);
        self.set_part(part, filled)
    }

    /// Replace `{key}` placeholders in the body, headers and footers.
    ///
    /// With `fill_all_gaps`, every placeholder found in any part that `vars`
    /// does not cover is replaced with empty text. Supplied values always win
    /// over discovered ones.
    pub fn set_data(&mut self, vars: &Variables, fill_all_gaps: bool) -> Result<&mut Self> {
        let substitution = if fill_all_gaps {
            let mut merged = vars.clone();
            merged.merge_missing(&self.all_variables()?);
            tracing::debug!(
                "filling {} variables ({} supplied)",
                merged.len(),
                vars.len()
            );
            Substitution::from_variables(&merged)
        } else {
            tracing::debug!("filling {} variables", vars.len());
            Substitution::from_variables(vars)
        };

        for part in Part::ALL {
            self.fill_part(part, &substitution)?;
        }
        Ok(self)
    }

    /// Placeholder keys of one part, each mapped to empty text.
    pub fn read_all_variables(&mut self, part: Part) -> Result<Variables> {
        let text = self.get_part(part)?;
        Ok(placeholder_keys(text)
            .into_iter()
            .map(|key| (key, String::new()))
            .collect())
    }

    /// Placeholder keys across all parts, each mapped to empty text.
    pub fn all_variables(&mut self) -> Result<Variables> {
        let mut all = Variables::new();
        for part in Part::ALL {
            all.merge_missing(&self.read_all_variables(part)?);
        }
        Ok(all)
    }

    /// Write the document to `destination`.
    ///
    /// Buffered part writes are flushed into the temporary file, which is
    /// then moved to `destination`. The move is a rename, so it fails with
    /// [`Error::SaveFailed`] when `destination` is on another filesystem than
    /// the temp directory.
    pub fn save(self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let finished = self.container.finish(&self.temp_dir)?;

        finished
            .persist(destination)
            .map_err(|e| Error::SaveFailed {
                path: destination.to_path_buf(),
                source: e.error,
            })?;

        tracing::debug!("saved {}", destination.display());
        Ok(())
    }
}
