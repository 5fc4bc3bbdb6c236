use std::path::{Path, PathBuf};

use crate::{
    fs::FileSystemError,
    hf::{id::HfRepoId, HfError, HfResult, ModelRegistry},
};

/// A directory mirror laid out as `<root>/<namespace>/<repo_name>/<file>`.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> HfResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FileSystemError::NotADirectory { path: root }.into());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_dir(&self, repo_id: &HfRepoId) -> PathBuf {
        self.root
            .join(repo_id.name_space())
            .join(repo_id.repo_name())
    }
}

impl ModelRegistry for LocalRegistry {
    fn fetch_file(&self, repo_id: &HfRepoId, file_name: &str) -> HfResult<PathBuf> {
        let path = self.repo_dir(repo_id).join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(HfError::FileNotFound {
                repo_id: repo_id.to_string(),
                file: file_name.to_owned(),
            })
        }
    }

    fn list_files(&self, repo_id: &HfRepoId) -> HfResult<Vec<String>> {
        let dir = self.repo_dir(repo_id);
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .map_err(|e| FileSystemError::from_io_error("read_dir", &dir, e))?
        {
            let entry = entry.map_err(|e| FileSystemError::from_io_error("read_dir", &dir, e))?;
            if entry.path().is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }
}
