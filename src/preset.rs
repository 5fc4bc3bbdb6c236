//! The fixed table of tiny-model presets.
//!
//! Each [`ModelFamily`] maps to exactly one [`TinyModelPreset`]. The presets are
//! kept side by side in [`PRESETS`] so the dimensions of all three families can
//! be audited in one place.

use std::{fmt, path::Path, path::PathBuf, str::FromStr};

use crate::config_json::ConfigOverrides;

/// Root under which each family's output directory is created.
pub const DEFAULT_OUTPUT_ROOT: &str = "/tmp/nemo-skills-tests";

/// Name of the artifact directory inside each family directory.
pub const OUTPUT_DIR_NAME: &str = "tiny-model-hf";

/// Every tiny model is collapsed to this many transformer blocks.
pub const NUM_HIDDEN_LAYERS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ModelFamily {
    #[value(name = "llama")]
    Llama,
    #[value(name = "qwen")]
    Qwen,
    #[value(name = "qwen_orm")]
    QwenOrm,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [ModelFamily::Llama, ModelFamily::Qwen, ModelFamily::QwenOrm];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Llama => "llama",
            ModelFamily::Qwen => "qwen",
            ModelFamily::QwenOrm => "qwen_orm",
        }
    }

    pub fn preset(&self) -> &'static TinyModelPreset {
        match self {
            ModelFamily::Llama => &PRESETS[0],
            ModelFamily::Qwen => &PRESETS[1],
            ModelFamily::QwenOrm => &PRESETS[2],
        }
    }

    /// The reward model is saved without a language-model head.
    pub fn is_reward_model(&self) -> bool {
        matches!(self, ModelFamily::QwenOrm)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = crate::TinyModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llama" => Ok(ModelFamily::Llama),
            "qwen" => Ok(ModelFamily::Qwen),
            "qwen_orm" => Ok(ModelFamily::QwenOrm),
            other => Err(crate::TinyModelError::InvalidFamily(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TinyModelPreset {
    pub family: ModelFamily,
    pub base_model_id: &'static str,
    pub hidden_size: u64,
    pub head_dim: u64,
    pub max_position_embeddings: u64,
    pub num_attention_heads: u64,
}

pub const PRESETS: [TinyModelPreset; 3] = [
    TinyModelPreset {
        family: ModelFamily::Llama,
        base_model_id: "meta-llama/Meta-Llama-3.1-8B-Instruct",
        hidden_size: 64,
        head_dim: 2,
        max_position_embeddings: 256,
        num_attention_heads: 8,
    },
    TinyModelPreset {
        family: ModelFamily::Qwen,
        base_model_id: "Qwen/Qwen2.5-Math-7B",
        hidden_size: 56,
        head_dim: 2,
        max_position_embeddings: 256,
        num_attention_heads: 8,
    },
    // The downstream inference engine requires head_dim >= 32.
    TinyModelPreset {
        family: ModelFamily::QwenOrm,
        base_model_id: "Qwen/Qwen2.5-Math-RM-72B",
        hidden_size: 256,
        head_dim: 32,
        max_position_embeddings: 2048,
        num_attention_heads: 8,
    },
];

impl TinyModelPreset {
    /// `<output_root>/<family>/tiny-model-hf`
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.family.as_str()).join(OUTPUT_DIR_NAME)
    }

    pub fn default_output_dir(&self) -> PathBuf {
        self.output_dir(Path::new(DEFAULT_OUTPUT_ROOT))
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            hidden_size: self.hidden_size,
            head_dim: self.head_dim,
            intermediate_size: self.hidden_size,
            num_hidden_layers: NUM_HIDDEN_LAYERS,
            max_position_embeddings: self.max_position_embeddings,
            num_attention_heads: self.num_attention_heads,
        }
    }
}
