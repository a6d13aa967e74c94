use crate::domain::ports::Storage;
use crate::utils::error::{Result, SimpError};
use std::fs;
use std::path::PathBuf;

/// Plain filesystem storage. Relative paths resolve against `base_path`.
/// Writes never create missing directories.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        if !full_path.exists() {
            return Err(SimpError::InputNotFound {
                path: path.to_string(),
            });
        }
        fs::read(&full_path).map_err(|source| SimpError::ReadError {
            path: path.to_string(),
            source,
        })
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        tracing::debug!("Writing {} bytes to {}", data.len(), full_path.display());

        fs::write(&full_path, data).map_err(|source| SimpError::WriteError {
            path: path.to_string(),
            source,
        })
    }
}
