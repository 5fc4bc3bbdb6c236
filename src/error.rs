use crate::{config_json::ConfigError, fs::FileSystemError, hf::error::HfError};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TinyModelError {
    #[error("Invalid model type '{0}': expected one of llama, qwen, qwen_orm")]
    InvalidFamily(String),

    #[error(transparent)]
    Hf(#[from] HfError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Tensor '{name}' has {len} values but its shape {shape:?} needs {expected}")]
    TensorShape {
        name: String,
        shape: Vec<usize>,
        len: usize,
        expected: usize,
    },

    #[error(transparent)]
    SafeTensors(#[from] safetensors::SafeTensorError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

impl From<tokenizers::Error> for TinyModelError {
    fn from(e: tokenizers::Error) -> Self {
        Self::Tokenizer(e.to_string())
    }
}

pub type TinyModelResult<T> = std::result::Result<T, TinyModelError>;
