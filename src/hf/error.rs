use crate::hf::id::HfRepoIdError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HfError {
    /* ────── validation & parsing ────── */
    #[error(transparent)]
    RepoId(#[from] HfRepoIdError),

    /* ────── hub / network / fs ────── */
    #[error(transparent)]
    Api(#[from] hf_hub::api::sync::ApiError),

    #[error("File '{file}' not found in repository '{repo_id}'")]
    FileNotFound { repo_id: String, file: String },

    #[error(transparent)]
    FileSystem(#[from] crate::fs::FileSystemError),
}

pub type HfResult<T> = std::result::Result<T, HfError>;
