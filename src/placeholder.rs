//! Placeholder syntax, cleanup and substitution.
//!
//! A placeholder is `{key}` where the key is any run of characters up to the
//! first closing brace, newlines included. Word frequently splits what the
//! author typed as `{name}` across several runs, e.g.
//! `{<w:r><w:t>na</w:t></w:r><w:r><w:t>me}`, so part text is cleaned before
//! matching: markup inside a placeholder is dropped, markup outside it is
//! left alone.

use crate::variables::Variables;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Opening placeholder delimiter.
pub const TAG_OPEN: char = '{';

/// Closing placeholder delimiter.
pub const TAG_CLOSE: char = '}';

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}(.+?){}",
        regex::escape(&TAG_OPEN.to_string()),
        regex::escape(&TAG_CLOSE.to_string())
    );
    Regex::new(&pattern).expect("placeholder pattern is valid")
});

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Wrap a key in placeholder delimiters.
pub fn wrap(key: &str) -> String {
    let mut token = String::with_capacity(key.len() + 2);
    token.push(TAG_OPEN);
    token.push_str(key);
    token.push(TAG_CLOSE);
    token
}

/// Strip markup from inside every placeholder of `raw_xml`.
///
/// Text outside placeholders, markup included, is returned unchanged.
///
/// # Example
///
/// ```
/// use docx_template::placeholder::clean_placeholders;
///
/// let xml = "<w:t>{</w:t><w:t>name}</w:t>";
/// assert_eq!(clean_placeholders(xml), "<w:t>{name}</w:t>");
/// ```
pub fn clean_placeholders(raw_xml: &str) -> String {
    PLACEHOLDER
        .replace_all(raw_xml, |caps: &Captures| strip_tags(&caps[0]))
        .into_owned()
}

/// Remove tags, comments and processing instructions from an XML fragment.
///
/// The fragment may start or end in the middle of an element, so unbalanced
/// start and end tags are accepted. Text is kept exactly as written, entity
/// references included.
pub fn strip_tags(fragment: &str) -> String {
    if !fragment.contains('<') {
        return fragment.to_string();
    }

    let mut reader = Reader::from_str(fragment);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut text = String::with_capacity(fragment.len());
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => text.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::trace!("falling back to plain markup scan: {}", e);
                return MARKUP.replace_all(fragment, "").into_owned();
            }
        }
    }
    text
}

/// Distinct placeholder keys of `xml`, in order of first occurrence.
///
/// Keys are read from the text as given; run [`clean_placeholders`] first
/// when the text comes straight from the archive.
pub fn placeholder_keys(xml: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(xml)
        .filter_map(|caps| {
            let key = &caps[1];
            seen.insert(key.to_string()).then(|| key.to_string())
        })
        .collect()
}

/// An ordered list of literal token replacements.
///
/// Tokens are applied one after another, each replacing every occurrence in
/// the output of the previous one. A value that contains a token listed
/// later is therefore replaced as well.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    pairs: Vec<(String, String)>,
}

impl Substitution {
    /// Build a substitution from literal `(token, value)` pairs, in order.
    ///
    /// Empty tokens are ignored.
    pub fn new<I, T, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, V)>,
        T: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(token, value)| (token.into(), value.into()))
            .filter(|(token, _): &(String, String)| !token.is_empty())
            .collect();
        Self { pairs }
    }

    /// Build a substitution replacing `{key}` with the value of each variable.
    pub fn from_variables(vars: &Variables) -> Self {
        Self::new(vars.iter().map(|(key, value)| (wrap(key), value)))
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replace every occurrence of every token in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (token, value)| {
                if acc.contains(token.as_str()) {
                    acc.replace(token.as_str(), value)
                } else {
                    acc
                }
            })
    }
}
