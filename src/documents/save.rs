//! Save-location prompt and file output for generated documents

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::DomainError;

/// Asks the operator where to save a document. Returning `None` cancels the
/// export without error.
pub trait SaveLocationPrompt: Send {
    fn choose(&mut self, suggested_name: &str) -> Option<PathBuf>;
}

impl<F> SaveLocationPrompt for F
where
    F: FnMut(&str) -> Option<PathBuf> + Send,
{
    fn choose(&mut self, suggested_name: &str) -> Option<PathBuf> {
        self(suggested_name)
    }
}

/// Saves under the suggested name inside a fixed directory
pub struct DirectoryPrompt {
    pub dir: PathBuf,
}

impl SaveLocationPrompt for DirectoryPrompt {
    fn choose(&mut self, suggested_name: &str) -> Option<PathBuf> {
        Some(self.dir.join(suggested_name))
    }
}

/// Saves at an explicit path, adding `.docx` when no extension is given
pub struct FixedPath {
    pub path: PathBuf,
}

impl SaveLocationPrompt for FixedPath {
    fn choose(&mut self, _suggested_name: &str) -> Option<PathBuf> {
        let mut path = self.path.clone();
        if path.extension().is_none() {
            path.set_extension("docx");
        }
        Some(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Cancelled,
}

/// Write `bytes` to `path` through a sibling temporary file, so a failed
/// write never leaves a truncated document behind.
pub async fn write_document(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| DomainError::validation(format!("Chemin invalide : {}", path.display())))?;
    tmp_name.push(".part");
    let tmp = path.with_file_name(tmp_name);

    let result = async {
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(DomainError::Io(format!(
            "Impossible d'enregistrer {} : {}",
            path.display(),
            e
        )));
    }

    Ok(())
}
