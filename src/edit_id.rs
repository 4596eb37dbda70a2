use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// Name of the markup attribute that carries a serialized [`EditId`]
pub const EDIT_ID_ATTRIBUTE: &str = "data-edit-id";

/// Marker attribute that permits editing of a tagged element
pub const EDIT_ENABLED_ATTRIBUTE: &str = "data-edit-enabled";

/// Stable address of one editable element in a source file.
///
/// Serialized as `<file_path>:<line>:<column>`. The path is project-relative
/// with forward slashes and may itself contain colons, so parsing splits from
/// the right. `line` is 1-based, `column` is 0-based and counted in Unicode
/// scalar values from the start of the line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct EditId {
    file_path: String,
    #[fieldwork(get(copy))]
    line: usize,
    #[fieldwork(get(copy))]
    column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditIdError {
    #[error("expected `<path>:<line>:<column>`")]
    TooFewSegments,
    #[error("file path is empty")]
    EmptyPath,
    #[error("line `{0}` is not a positive integer")]
    InvalidLine(String),
    #[error("column `{0}` is not a non-negative integer")]
    InvalidColumn(String),
}

impl EditId {
    pub fn new(file_path: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }

    /// Zero-based line index, as used by ropey and tree-sitter
    pub fn line_index(&self) -> usize {
        self.line.saturating_sub(1)
    }
}

impl Display for EditId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.column)
    }
}

impl FromStr for EditId {
    type Err = EditIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.rsplitn(3, ':');
        let column = segments.next().ok_or(EditIdError::TooFewSegments)?;
        let line = segments.next().ok_or(EditIdError::TooFewSegments)?;
        let file_path = segments.next().ok_or(EditIdError::TooFewSegments)?;

        if file_path.is_empty() {
            return Err(EditIdError::EmptyPath);
        }

        let line = line
            .parse::<usize>()
            .ok()
            .filter(|line| *line >= 1)
            .ok_or_else(|| EditIdError::InvalidLine(line.to_string()))?;

        let column = column
            .parse::<usize>()
            .map_err(|_| EditIdError::InvalidColumn(column.to_string()))?;

        Ok(Self::new(file_path, line, column))
    }
}

impl Serialize for EditId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EditId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
