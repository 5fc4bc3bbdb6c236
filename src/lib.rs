//! # llm_tiny_models: tiny random checkpoints for tests
//!
//! Shrinks a pretrained model family to a two-layer, randomly initialized
//! model and writes it, together with the unmodified base tokenizer, as a
//! Hugging Face style directory (`config.json`, `model.safetensors`,
//! `tokenizer.json`, ...). The output loads like any other checkpoint, which
//! makes it a fast fixture for inference and evaluation pipelines.
//!
//! ```no_run
//! use llm_tiny_models::{GeneratorConfig, HfConfig, ModelFamily, TinyModelGenerator};
//!
//! let client = HfConfig::default().build()?;
//! let report = TinyModelGenerator::new(client, GeneratorConfig::default())
//!     .generate(ModelFamily::Qwen)?;
//! println!("{report}");
//! # Ok::<(), llm_tiny_models::TinyModelError>(())
//! ```

pub mod config_json;
pub mod error;
pub mod fs;
pub mod generator;
pub mod hf;
pub mod logging;
pub mod model;
pub mod preset;
pub mod tokenizer;

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

pub use self::{
    config_json::{ArchitectureConfig, ConfigError, ConfigOverrides},
    error::{TinyModelError, TinyModelResult},
    generator::{GenerationReport, GeneratorConfig, TinyModelGenerator},
    hf::{HfClient, HfConfig, HfRepoId, LocalRegistry, ModelRegistry},
    logging::{LoggingConfig, LoggingConfigTrait},
    model::{ModelHead, TinyModel},
    preset::{ModelFamily, TinyModelPreset, PRESETS},
    tokenizer::PretrainedTokenizer,
};
