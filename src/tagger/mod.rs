mod source_map;
mod visitor;

#[cfg(test)]
mod tests;

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use ropey::Rope;
use thiserror::Error;

use crate::{
    config::TaggerConfig,
    edit_id::{EditId, EDIT_ID_ATTRIBUTE},
    languages::{utils::error_lines, LanguageRegistry},
};
use visitor::{EditableElement, EditableElementVisitor};

/// Result of tagging one file
#[derive(Debug, Clone, PartialEq, Eq, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct TransformOutput {
    code: String,
    /// Source map (v3 JSON) from `code` back to the original source
    source_map: String,
    /// Identifiers injected in this pass, in source order
    edit_ids: Vec<EditId>,
}

impl TransformOutput {
    pub fn into_code(self) -> String {
        self.code
    }
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("{} is not a component template", .0.display())]
    Unsupported(PathBuf),
    #[error("{} is a dependency", .0.display())]
    Dependency(PathBuf),
    #[error("{} is outside the project root", .0.display())]
    OutsideRoot(PathBuf),
    #[error("syntax errors in {} on lines {lines:?}", .path.display())]
    Parse { path: PathBuf, lines: Vec<usize> },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Build-time pass that injects `data-edit-id` attributes into editable
/// JSX elements.
///
/// Only attributes are inserted, and never with a line break, so every line
/// keeps its number in the output.
#[derive(fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Tagger {
    config: TaggerConfig,
    root: PathBuf,
    #[fieldwork(skip)]
    language_registry: LanguageRegistry,
}

impl Tagger {
    pub fn new(config: TaggerConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            language_registry: LanguageRegistry::new(),
        }
    }

    /// Whether `file_path` is a component template this tagger would touch
    pub fn handles(&self, file_path: &Path) -> bool {
        self.language_registry.language_for_path(file_path).is_some() && !is_dependency(file_path)
    }

    /// Build-tool transform hook. Returns `None` when the file is not a
    /// component template, has nothing to tag, or fails to parse.
    pub fn transform(&self, source: &str, file_path: &Path) -> Option<TransformOutput> {
        match self.try_transform(source, file_path) {
            Ok(output) => output,
            Err(TagError::Unsupported(_) | TagError::Dependency(_)) => None,
            Err(error) => {
                log::error!("[inline-edit] Error processing file: {error}");
                None
            }
        }
    }

    /// Like [`Tagger::transform`], but reports why a file was passed through
    pub fn try_transform(
        &self,
        source: &str,
        file_path: &Path,
    ) -> Result<Option<TransformOutput>, TagError> {
        let language = self
            .language_registry
            .language_for_path(file_path)
            .ok_or_else(|| TagError::Unsupported(file_path.to_path_buf()))?;

        if is_dependency(file_path) {
            return Err(TagError::Dependency(file_path.to_path_buf()));
        }

        let relative_path = self.relative_path(file_path)?;

        let tree = language.parse(source)?;
        if tree.root_node().has_error() {
            return Err(TagError::Parse {
                path: file_path.to_path_buf(),
                lines: error_lines(&tree),
            });
        }

        let mut elements = EditableElementVisitor::new(&self.config, source).visit(&tree);
        if elements.is_empty() {
            return Ok(None);
        }

        // elements nested in attribute values are visited before their
        // owner's `>` but inserted after it
        elements.sort_by_key(|element| element.insert_at);

        let insertions = elements
            .iter()
            .map(|element| Insertion::new(element, &relative_path))
            .collect::<Vec<_>>();

        if self.config.debug() {
            for (element, insertion) in elements.iter().zip(&insertions) {
                log::info!(
                    "[inline-edit] Added edit ID to <{}> ({:?}) at {}",
                    element.tag_name,
                    element.text,
                    insertion.edit_id
                );
            }
        }

        let code = apply_insertions(source, &insertions);
        let source_map = source_map::build(&relative_path, source, &insertions)?;

        Ok(Some(TransformOutput {
            code,
            source_map,
            edit_ids: insertions.into_iter().map(|i| i.edit_id).collect(),
        }))
    }

    /// Project-relative, forward-slash form of `file_path`
    pub fn relative_path(&self, file_path: &Path) -> Result<String, TagError> {
        let relative = if file_path.is_absolute() {
            file_path
                .strip_prefix(&self.root)
                .map_err(|_| TagError::OutsideRoot(file_path.to_path_buf()))?
        } else {
            file_path
        };

        let mut segments = vec![];
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::CurDir => {}
                _ => return Err(TagError::OutsideRoot(file_path.to_path_buf())),
            }
        }

        Ok(segments.join("/"))
    }
}

impl std::fmt::Debug for Tagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tagger")
            .field("config", &self.config)
            .field("root", &self.root)
            .finish()
    }
}

pub(crate) fn is_dependency(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == "node_modules")
}

/// Attribute text inserted in front of an opening tag's `>`
#[derive(Debug, Clone)]
pub(crate) struct Insertion {
    pub(crate) byte_offset: usize,
    /// Position of the insertion point in the original source
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) edit_id: EditId,
    pub(crate) text: String,
}

impl Insertion {
    fn new(element: &EditableElement, relative_path: &str) -> Self {
        let edit_id = EditId::new(relative_path, element.row + 1, element.column);
        Self {
            byte_offset: element.insert_at,
            row: element.insert_row,
            column: element.insert_column,
            text: format!(" {}", render_attribute(&edit_id)),
            edit_id,
        }
    }
}

/// JSX string attributes have no escapes, so values that could break the
/// quoting or the line structure become expression containers.
fn render_attribute(edit_id: &EditId) -> String {
    let value = edit_id.to_string();
    if value.contains(['"', '\n', '\r']) {
        let literal = serde_json::Value::String(value).to_string();
        format!("{EDIT_ID_ATTRIBUTE}={{{literal}}}")
    } else {
        format!("{EDIT_ID_ATTRIBUTE}=\"{value}\"")
    }
}

fn apply_insertions(source: &str, insertions: &[Insertion]) -> String {
    let mut rope = Rope::from_str(source);
    for insertion in insertions.iter().rev() {
        let char_idx = rope.byte_to_char(insertion.byte_offset);
        rope.insert(char_idx, &insertion.text);
    }
    rope.to_string()
}
