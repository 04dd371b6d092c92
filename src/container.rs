//! Writable ZIP container backed by a private working copy.
//!
//! The template file is never touched: it is copied into the temporary
//! directory and all reads and writes go through that copy. Replacement
//! entries are buffered in memory and only reach disk when the container is
//! finished.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const TEMP_PREFIX: &str = "docx";
const TEMP_SUFFIX: &str = ".tmp";

/// Upper bound on the buffer reserved up front for an entry; the declared
/// size comes from the archive and is not trusted beyond this.
const MAX_PREALLOC: usize = 1 << 20;

/// ZIP archive of a Word document, opened on a temporary copy.
pub struct DocxContainer {
    working: NamedTempFile,
    archive: ZipArchive<File>,
    /// Entries written since open, keyed by entry name
    pending: BTreeMap<String, Vec<u8>>,
}

impl DocxContainer {
    /// Copy `source` into `temp_dir` and open the copy as an archive.
    ///
    /// The copy is deleted again if anything after the copy fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docx_template::container::DocxContainer;
    ///
    /// let container = DocxContainer::open("letter.docx", std::env::temp_dir())?;
    /// assert!(container.exists("word/document.xml"));
    /// # Ok::<(), docx_template::Error>(())
    /// ```
    pub fn open(source: impl AsRef<Path>, temp_dir: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(Error::FileNotFound(source.to_path_buf()));
        }

        let copy_failed = |e: io::Error| Error::CopyFailed {
            path: source.to_path_buf(),
            source: e,
        };

        let mut working = new_temp_file(temp_dir.as_ref()).map_err(copy_failed)?;
        let mut input = File::open(source).map_err(copy_failed)?;
        io::copy(&mut input, working.as_file_mut()).map_err(copy_failed)?;
        working.as_file_mut().flush().map_err(copy_failed)?;

        let unpack_failed = |reason: String| Error::UnpackFailed {
            path: source.to_path_buf(),
            reason,
        };
        let file = working.reopen().map_err(|e| unpack_failed(e.to_string()))?;
        let archive = ZipArchive::new(file).map_err(|e| unpack_failed(e.to_string()))?;

        tracing::debug!(
            "opened {} as {} ({} entries)",
            source.display(),
            working.path().display(),
            archive.len()
        );

        Ok(Self {
            working,
            archive,
            pending: BTreeMap::new(),
        })
    }

    /// Path of the working copy.
    pub fn working_path(&self) -> &Path {
        self.working.path()
    }

    /// Read an entry's bytes, or `None` if the archive has no such entry.
    ///
    /// Entries written with [`write_entry`](Self::write_entry) are returned
    /// as written.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        if let Some(data) = self.pending.get(name) {
            return Ok(Some(data.clone()));
        }

        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    /// Read an XML entry as text.
    ///
    /// UTF-8 (with or without BOM) and UTF-16 (LE or BE, with BOM) parts are
    /// accepted. A UTF-16 declaration is rewritten to UTF-8 so the text can
    /// be stored back as is.
    pub fn read_xml(&mut self, name: &str) -> Result<Option<String>> {
        match self.read_entry(name)? {
            Some(bytes) => Ok(Some(decode_xml(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replace an entry, or add it if the archive does not have it.
    pub fn write_entry(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        tracing::trace!("buffered write of {}", name);
        self.pending.insert(name, data.into());
    }

    /// Check if an entry exists, counting buffered writes.
    pub fn exists(&self, name: &str) -> bool {
        self.pending.contains_key(name) || self.archive.file_names().any(|n| n == name)
    }

    /// Names of all entries, archive order first, then new entries.
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.archive.file_names().map(String::from).collect();
        for name in self.pending.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Whether any entry has been written since open.
    pub fn is_modified(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flush buffered writes and hand back the finished file.
    ///
    /// Without writes the working copy is returned as it was copied.
    /// Otherwise the archive is rebuilt into a new temporary file in
    /// `staging_dir`: untouched entries are copied raw, written entries
    /// replace their originals in place and new entries are appended.
    pub fn finish(self, staging_dir: impl AsRef<Path>) -> Result<NamedTempFile> {
        let Self {
            working,
            mut archive,
            mut pending,
        } = self;

        if pending.is_empty() {
            tracing::debug!("no entries changed, keeping {}", working.path().display());
            return Ok(working);
        }

        let mut staged = new_temp_file(staging_dir.as_ref())?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let replaced = pending.len();

        let mut writer = ZipWriter::new(staged.as_file_mut());
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            match pending.remove(entry.name()) {
                Some(data) => {
                    writer.start_file(entry.name(), options)?;
                    writer.write_all(&data)?;
                }
                None => writer.raw_copy_file(entry)?,
            }
        }
        for (name, data) in pending {
            writer.start_file(name, options)?;
            writer.write_all(&data)?;
        }
        writer.finish()?;

        tracing::debug!(
            "rebuilt archive with {} written entries into {}",
            replaced,
            staged.path().display()
        );
        Ok(staged)
    }
}

impl std::fmt::Debug for DocxContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxContainer")
            .field("working", &self.working.path())
            .field("entries", &self.archive.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

fn capacity_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size).map_or(MAX_PREALLOC, |size| size.min(MAX_PREALLOC))
}

fn new_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
}

/// Decode XML bytes, honoring a UTF-8 or UTF-16 byte order mark.
fn decode_xml(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => {
            let units = rest.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
            utf16(units).map(|s| declare_utf8(&s))
        }
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
            utf16(units).map(|s| declare_utf8(&s))
        }
        _ => utf8(bytes),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn utf16(units: impl Iterator<Item = u16>) -> Result<String> {
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Point the XML declaration of already-decoded text at UTF-8.
fn declare_utf8(xml: &str) -> String {
    let Some(end) = xml.starts_with("<?xml").then(|| xml.find("?>")).flatten() else {
        return xml.to_string();
    };
    let (decl, rest) = xml.split_at(end);
    let decl = ["\"UTF-16\"", "'UTF-16'", "\"utf-16\"", "'utf-16'"]
        .iter()
        .fold(decl.to_string(), |d, enc| {
            d.replace(enc, &enc.replace("UTF-16", "UTF-8").replace("utf-16", "UTF-8"))
        });
    format!("{}{}", decl, rest)
}
