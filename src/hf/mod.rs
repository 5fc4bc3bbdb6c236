pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod local;

use std::path::PathBuf;

pub use client::HfClient;
pub use config::HfConfig;
pub use error::{HfError, HfResult};
pub use id::HfRepoId;
pub use local::LocalRegistry;

/// Source of model repository files.
///
/// Returned paths point at local copies that stay valid for the rest of the run.
pub trait ModelRegistry {
    fn fetch_file(&self, repo_id: &HfRepoId, file_name: &str) -> HfResult<PathBuf>;

    /// Names of the files in the repository, as paths relative to its root.
    fn list_files(&self, repo_id: &HfRepoId) -> HfResult<Vec<String>>;

    /// Fetches `file_name` only when it appears in `listing`, a result of
    /// [`ModelRegistry::list_files`] for the same repository.
    fn fetch_listed_file(
        &self,
        repo_id: &HfRepoId,
        listing: &[String],
        file_name: &str,
    ) -> HfResult<Option<PathBuf>> {
        if listing.iter().any(|f| f == file_name) {
            self.fetch_file(repo_id, file_name).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<R: ModelRegistry + ?Sized> ModelRegistry for &R {
    fn fetch_file(&self, repo_id: &HfRepoId, file_name: &str) -> HfResult<PathBuf> {
        (**self).fetch_file(repo_id, file_name)
    }

    fn list_files(&self, repo_id: &HfRepoId) -> HfResult<Vec<String>> {
        (**self).list_files(repo_id)
    }
}
