//
mod generate;

#[allow(unused_imports)]
use anyhow::{anyhow, bail, Error, Result};
use llm_tiny_models::{
    GeneratorConfig, HfRepoId, LocalRegistry, ModelFamily, ModelRegistry, TinyModelGenerator,
};
use safetensors::SafeTensors;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Vocabularies are cut down so the embeddings stay small; every other field
// mirrors the published config of the base model.
const FIXTURE_VOCAB_SIZE: u64 = 512;

fn llama_config() -> Value {
    json!({
        "architectures": ["LlamaForCausalLM"],
        "attention_bias": false,
        "attention_dropout": 0.0,
        "bos_token_id": 128000,
        "eos_token_id": [128001, 128008, 128009],
        "hidden_act": "silu",
        "hidden_size": 4096,
        "initializer_range": 0.02,
        "intermediate_size": 14336,
        "max_position_embeddings": 131072,
        "mlp_bias": false,
        "model_type": "llama",
        "num_attention_heads": 32,
        "num_hidden_layers": 32,
        "num_key_value_heads": 8,
        "pretraining_tp": 1,
        "rms_norm_eps": 1e-05,
        "rope_scaling": {
            "factor": 8.0,
            "low_freq_factor": 1.0,
            "high_freq_factor": 4.0,
            "original_max_position_embeddings": 8192,
            "rope_type": "llama3"
        },
        "rope_theta": 500000.0,
        "tie_word_embeddings": false,
        "torch_dtype": "bfloat16",
        "use_cache": true,
        "vocab_size": FIXTURE_VOCAB_SIZE
    })
}

fn qwen_config() -> Value {
    json!({
        "architectures": ["Qwen2ForCausalLM"],
        "attention_dropout": 0.0,
        "bos_token_id": 151643,
        "eos_token_id": 151643,
        "hidden_act": "silu",
        "hidden_size": 3584,
        "initializer_range": 0.02,
        "intermediate_size": 18944,
        "max_position_embeddings": 4096,
        "max_window_layers": 28,
        "model_type": "qwen2",
        "num_attention_heads": 28,
        "num_hidden_layers": 28,
        "num_key_value_heads": 4,
        "rms_norm_eps": 1e-06,
        "rope_theta": 10000,
        "sliding_window": 4096,
        "tie_word_embeddings": false,
        "torch_dtype": "bfloat16",
        "use_cache": true,
        "use_sliding_window": false,
        "vocab_size": FIXTURE_VOCAB_SIZE
    })
}

fn qwen_orm_config() -> Value {
    json!({
        "architectures": ["Qwen2ForRewardModel"],
        "auto_map": {
            "AutoConfig": "configuration_qwen2_rm.Qwen2RMConfig",
            "AutoModel": "modeling_qwen2_rm.Qwen2ForRewardModel"
        },
        "attention_dropout": 0.0,
        "bos_token_id": 151643,
        "eos_token_id": 151643,
        "hidden_act": "silu",
        "hidden_size": 8192,
        "initializer_range": 0.02,
        "intermediate_size": 29568,
        "max_position_embeddings": 4096,
        "max_window_layers": 80,
        "model_type": "qwen2",
        "num_attention_heads": 64,
        "num_hidden_layers": 80,
        "num_key_value_heads": 8,
        "rms_norm_eps": 1e-06,
        "rope_theta": 10000.0,
        "sliding_window": 4096,
        "tie_word_embeddings": false,
        "torch_dtype": "bfloat16",
        "use_cache": true,
        "use_sliding_window": false,
        "vocab_size": FIXTURE_VOCAB_SIZE
    })
}

fn base_config(family: ModelFamily) -> Value {
    match family {
        ModelFamily::Llama => llama_config(),
        ModelFamily::Qwen => qwen_config(),
        ModelFamily::QwenOrm => qwen_orm_config(),
    }
}

// Byte-level BPE without merges, in the GPT-2 byte-to-unicode alphabet.
fn byte_level_tokenizer() -> Value {
    let mut vocab = Map::new();
    let mut n = 0u32;
    for b in 0u32..=255 {
        let printable = (33..=126).contains(&b) || (161..=172).contains(&b) || b >= 174;
        let ch = if printable {
            char::from_u32(b).unwrap()
        } else {
            n += 1;
            char::from_u32(255 + n).unwrap()
        };
        vocab.insert(ch.to_string(), json!(b));
    }
    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "ByteLevel", "add_prefix_space": false, "trim_offsets": true, "use_regex": true},
        "post_processor": null,
        "decoder": {"type": "ByteLevel", "add_prefix_space": false, "trim_offsets": true, "use_regex": true},
        "model": {"type": "BPE", "dropout": null, "unk_token": null, "continuing_subword_prefix": null,
                  "end_of_word_suffix": null, "fuse_unk": false, "byte_fallback": false,
                  "vocab": vocab, "merges": []}
    })
}

/// A local mirror holding config and tokenizer files for all three base models.
struct Fixture {
    _registry_dir: TempDir,
    output_dir: TempDir,
    registry: LocalRegistry,
}

impl Fixture {
    fn new() -> Result<Self> {
        let registry_dir = tempfile::tempdir()?;
        for family in ModelFamily::ALL {
            let repo = registry_dir.path().join(family.preset().base_model_id);
            std::fs::create_dir_all(&repo)?;
            std::fs::write(repo.join("config.json"), base_config(family).to_string())?;
            std::fs::write(
                repo.join("tokenizer.json"),
                byte_level_tokenizer().to_string(),
            )?;
            std::fs::write(
                repo.join("tokenizer_config.json"),
                json!({
                    "bos_token": null,
                    "eos_token": "<|endoftext|>",
                    "model_max_length": 131072,
                    "tokenizer_class": "PreTrainedTokenizerFast"
                })
                .to_string(),
            )?;
        }
        let registry = LocalRegistry::new(registry_dir.path())?;
        Ok(Self {
            _registry_dir: registry_dir,
            output_dir: tempfile::tempdir()?,
            registry,
        })
    }

    fn output_root(&self) -> &Path {
        self.output_dir.path()
    }

    fn generator(&self) -> TinyModelGenerator<&LocalRegistry> {
        TinyModelGenerator::new(
            &self.registry,
            GeneratorConfig::default().with_output_root(self.output_root()),
        )
    }
}

fn read_json(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn tensor_names(dir: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(dir.join("model.safetensors"))?;
    let st = SafeTensors::deserialize(&bytes)?;
    Ok(st.names().into_iter().cloned().collect())
}

fn tensor_bytes(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let bytes = std::fs::read(dir.join("model.safetensors"))?;
    let st = SafeTensors::deserialize(&bytes)?;
    Ok(st.tensor(name)?.data().to_vec())
}
