//! Class label tables.
//!
//! Labels are index-aligned with the class logits of the detection tensor:
//! class `i` resolves to `labels[i]`. Label files hold one name per line.

use crate::util::{DecodeError, DecodeResult};
use std::fs;
use std::path::Path;

/// Ordered, read-only list of class names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Wraps an already ordered list of names.
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parses one label per line, trimming whitespace and skipping blank lines.
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Loads a label file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> DecodeResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| DecodeError::LabelIo {
            reason: format!("{}: {err}", path.display()),
        })?;
        Ok(Self::from_lines(&text))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the name of class `index`, if the table has one.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}
