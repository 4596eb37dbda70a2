mod locate;
mod locks;


use std::{
    io::Write,
    path::{Component, Path, PathBuf},
    sync::PoisonError,
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::edit_id::{EditId, EditIdError};
use locks::FileLocks;

/// Body of `POST /api/apply-edit`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    pub edit_id: Option<String>,
    pub new_text: Option<String>,
    pub original_text: Option<String>,
    /// Page the edit was made on
    pub url: Option<String>,
}

impl PatchRequest {
    pub fn new(edit_id: &EditId, new_text: &str, original_text: &str, url: &str) -> Self {
        Self {
            edit_id: Some(edit_id.to_string()),
            new_text: Some(new_text.to_string()),
            original_text: Some(original_text.to_string()),
            url: Some(url.to_string()),
        }
    }
}

/// A fully validated [`PatchRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidEdit<'a> {
    edit_id: EditId,
    new_text: &'a str,
    original_text: &'a str,
}

impl<'a> TryFrom<&'a PatchRequest> for ValidEdit<'a> {
    type Error = ApplyEditError;

    fn try_from(request: &'a PatchRequest) -> Result<Self, Self::Error> {
        let present = |field: &'a Option<String>| field.as_deref().filter(|s| !s.is_empty());

        let (Some(edit_id), Some(new_text), Some(original_text)) = (
            present(&request.edit_id),
            present(&request.new_text),
            present(&request.original_text),
        ) else {
            return Err(ApplyEditError::MissingFields);
        };

        Ok(Self {
            edit_id: edit_id.parse()?,
            new_text,
            original_text,
        })
    }
}

#[derive(Debug, Error)]
pub enum ApplyEditError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid edit ID format: {0}")]
    InvalidEditId(#[from] EditIdError),
    #[error("Path is outside the project root: {0}")]
    OutsideRoot(String),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Line {line} not found in file")]
    LineNotFound { line: usize },
    #[error("Original text not found near line {line}, column {column}")]
    TextNotFound { line: usize, column: usize },
    #[error("Internal Server Error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApplyEditError {
    /// HTTP status reported for this failure
    pub fn status(&self) -> u16 {
        match self {
            Self::Io(_) => 500,
            _ => 400,
        }
    }
}

/// Outcome of a successful edit
#[derive(Debug, Clone, PartialEq, Eq, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct AppliedEdit {
    edit_id: EditId,
    /// Absolute path of the rewritten file
    path: PathBuf,
}

type AppliedHook = Box<dyn Fn(&AppliedEdit) + Send + Sync + 'static>;

/// Applies saved text edits to source files under a project root
#[derive(fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct EditApplier {
    root: PathBuf,
    #[fieldwork(get(copy), set, with)]
    debug: bool,
    #[fieldwork(skip)]
    locks: FileLocks,
    #[fieldwork(skip)]
    on_applied: Option<AppliedHook>,
}

impl std::fmt::Debug for EditApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditApplier")
            .field("root", &self.root)
            .field("debug", &self.debug)
            .field("locks", &self.locks)
            .finish()
    }
}

impl EditApplier {
    /// `root` should already be canonical
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debug: false,
            locks: FileLocks::default(),
            on_applied: None,
        }
    }

    /// Run `hook` after every successful write, e.g. to reload the module
    pub fn with_on_applied(mut self, hook: impl Fn(&AppliedEdit) + Send + Sync + 'static) -> Self {
        self.on_applied = Some(Box::new(hook));
        self
    }

    pub fn apply(&self, request: &PatchRequest) -> Result<AppliedEdit, ApplyEditError> {
        let ValidEdit {
            edit_id,
            new_text,
            original_text,
        } = ValidEdit::try_from(request)?;

        let path = self.resolve(edit_id.file_path())?;

        let lock = self.locks.for_path(&path);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut content = std::fs::read_to_string(&path)?;
        let range = locate::locate(&content, &edit_id, original_text)?;
        content.replace_range(range, new_text);
        write_atomically(&path, &content)?;

        drop(guard);

        if self.debug {
            log::info!(
                "[inline-edit] Updated {}:{}:{}",
                path.display(),
                edit_id.line(),
                edit_id.column()
            );
            log::info!("  Old text: {original_text}");
            log::info!("  New text: {new_text}");
        }

        let applied = AppliedEdit { edit_id, path };
        if let Some(hook) = &self.on_applied {
            hook(&applied);
        }
        Ok(applied)
    }

    /// Resolve a project-relative path, refusing anything that escapes the root
    fn resolve(&self, file_path: &str) -> Result<PathBuf, ApplyEditError> {
        let relative = Path::new(file_path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ApplyEditError::OutsideRoot(file_path.to_string()));
        }

        let joined = self.root.join(relative);
        let canonical = match std::fs::canonicalize(&joined) {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ApplyEditError::FileNotFound(file_path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        // symlinks can still point outside
        if !canonical.starts_with(&self.root) {
            return Err(ApplyEditError::OutsideRoot(file_path.to_string()));
        }

        Ok(canonical)
    }
}

/// Replace `path` with `content` through a sibling temp file, keeping permissions
fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let permissions = std::fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    std::fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
