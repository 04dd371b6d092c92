//! The document parts that take part in substitution.

use crate::error::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// A fixed section of a Word document backed by one XML entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    /// Main document body (`word/document.xml`)
    Document,
    /// First header (`word/header1.xml`)
    Header1,
    /// Second header (`word/header2.xml`)
    Header2,
    /// First footer (`word/footer1.xml`)
    Footer1,
    /// Second footer (`word/footer2.xml`)
    Footer2,
}

impl Part {
    /// All parts in the order they are filled.
    pub const ALL: [Part; 5] = [
        Part::Document,
        Part::Header1,
        Part::Header2,
        Part::Footer1,
        Part::Footer2,
    ];

    /// Section name as used in the archive entry name.
    pub fn name(&self) -> &'static str {
        match self {
            Part::Document => "document",
            Part::Header1 => "header1",
            Part::Header2 => "header2",
            Part::Footer1 => "footer1",
            Part::Footer2 => "footer2",
        }
    }

    /// Path of the archive entry holding this part.
    pub fn entry_path(&self) -> &'static str {
        match self {
            Part::Document => "word/document.xml",
            Part::Header1 => "word/header1.xml",
            Part::Header2 => "word/header2.xml",
            Part::Footer1 => "word/footer1.xml",
            Part::Footer2 => "word/footer2.xml",
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Part {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Part::ALL
            .into_iter()
            .find(|part| part.name() == s)
            .ok_or_else(|| Error::InvalidPart(s.to_string()))
    }
}
