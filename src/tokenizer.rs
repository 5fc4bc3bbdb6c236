use std::path::Path;

use serde_json::{json, Map, Value};
use tokenizers::Tokenizer as HFTokenizer;

use crate::{
    hf::{HfRepoId, ModelRegistry},
    TinyModelResult,
};

pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";
pub const TOKENIZER_CONFIG_FILE_NAME: &str = "tokenizer_config.json";
pub const SPECIAL_TOKENS_MAP_FILE_NAME: &str = "special_tokens_map.json";

const SPECIAL_TOKEN_KEYS: [&str; 7] = [
    "bos_token",
    "eos_token",
    "unk_token",
    "sep_token",
    "pad_token",
    "cls_token",
    "mask_token",
];

/// A base model's tokenizer, copied without modification.
///
/// Vocabulary and tokenization rules do not depend on the model dimensions, so
/// the tiny model reuses the full-size tokenizer as is.
pub struct PretrainedTokenizer {
    tokenizer: HFTokenizer,
    tokenizer_config: Option<Value>,
    special_tokens_map: Option<Value>,
}

impl std::fmt::Debug for PretrainedTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretrainedTokenizer")
            .field("vocab_size", &self.tokenizer.get_vocab_size(true))
            .field("tokenizer_config", &self.tokenizer_config.is_some())
            .field("special_tokens_map", &self.special_tokens_map.is_some())
            .finish()
    }
}

impl PretrainedTokenizer {
    pub fn from_registry<R: ModelRegistry>(
        registry: &R,
        repo_id: &HfRepoId,
    ) -> TinyModelResult<Self> {
        let tokenizer_path = registry.fetch_file(repo_id, TOKENIZER_FILE_NAME)?;
        let tokenizer = HFTokenizer::from_file(&tokenizer_path)?;

        let listing = registry.list_files(repo_id)?;
        let optional = |name: &str| -> TinyModelResult<Option<Value>> {
            registry
                .fetch_listed_file(repo_id, &listing, name)?
                .map(|p| read_json(&p))
                .transpose()
        };
        let tokenizer_config = optional(TOKENIZER_CONFIG_FILE_NAME)?;
        let special_tokens_map = optional(SPECIAL_TOKENS_MAP_FILE_NAME)?;

        crate::debug!(
            "loaded tokenizer for {repo_id} with {} tokens",
            tokenizer.get_vocab_size(true)
        );
        Ok(Self {
            tokenizer,
            tokenizer_config,
            special_tokens_map,
        })
    }

    /// Loads a tokenizer previously written by [`PretrainedTokenizer::save_pretrained`].
    pub fn from_dir(dir: &Path) -> TinyModelResult<Self> {
        let tokenizer = HFTokenizer::from_file(dir.join(TOKENIZER_FILE_NAME))?;
        let optional = |name: &str| -> TinyModelResult<Option<Value>> {
            let path = dir.join(name);
            if path.is_file() {
                read_json(&path).map(Some)
            } else {
                Ok(None)
            }
        };
        Ok(Self {
            tokenizer,
            tokenizer_config: optional(TOKENIZER_CONFIG_FILE_NAME)?,
            special_tokens_map: optional(SPECIAL_TOKENS_MAP_FILE_NAME)?,
        })
    }

    pub fn tokenizer(&self) -> &HFTokenizer {
        &self.tokenizer
    }

    pub fn tokenizer_config(&self) -> Option<&Value> {
        self.tokenizer_config.as_ref()
    }

    pub fn encode(&self, text: &str) -> TinyModelResult<Vec<u32>> {
        Ok(self.tokenizer.encode(text, false)?.get_ids().to_vec())
    }

    pub fn decode(&self, ids: &[u32]) -> TinyModelResult<String> {
        Ok(self.tokenizer.decode(ids, true)?)
    }

    /// The shipped `special_tokens_map.json`, or one derived from the special
    /// token entries of `tokenizer_config.json`.
    pub fn special_tokens_map(&self) -> Option<Value> {
        if let Some(map) = &self.special_tokens_map {
            return Some(map.clone());
        }
        let config = self.tokenizer_config.as_ref()?.as_object()?;
        let mut map = Map::new();
        for key in SPECIAL_TOKEN_KEYS
            .iter()
            .copied()
            .chain(["additional_special_tokens"])
        {
            match config.get(key) {
                None | Some(Value::Null) => {}
                Some(v) => {
                    map.insert(key.to_owned(), v.clone());
                }
            }
        }
        (!map.is_empty()).then_some(Value::Object(map))
    }

    /// Writes `tokenizer.json`, `tokenizer_config.json` and, when any special
    /// tokens are known, `special_tokens_map.json` into `dir`.
    pub fn save_pretrained(&self, dir: &Path) -> TinyModelResult<()> {
        crate::fs::ensure_dir(dir)?;

        self.tokenizer
            .save(dir.join(TOKENIZER_FILE_NAME), false)?;

        let tokenizer_config = self
            .tokenizer_config
            .clone()
            .unwrap_or_else(|| json!({ "tokenizer_class": "PreTrainedTokenizerFast" }));
        crate::fs::write_json(&dir.join(TOKENIZER_CONFIG_FILE_NAME), &tokenizer_config)?;

        if let Some(special_tokens_map) = self.special_tokens_map() {
            crate::fs::write_json(&dir.join(SPECIAL_TOKENS_MAP_FILE_NAME), &special_tokens_map)?;
        }

        crate::info!("saved tokenizer to {}", dir.display());
        Ok(())
    }
}

fn read_json(path: &Path) -> TinyModelResult<Value> {
    let text = crate::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
