use std::{fmt, path::Path};

use serde_json::{Map, Value};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.json must be a JSON object")]
    NotAnObject,

    #[error("config.json is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("config.json field '{field}' has an invalid value: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Unsupported model_type '{0}': expected 'llama' or 'qwen2'")]
    UnsupportedArchitecture(String),

    #[error("'{repo_id}' requires custom code (auto_map) but trust_remote_code is disabled")]
    RemoteCodeNotTrusted { repo_id: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// The dimension overrides that shrink a base architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub hidden_size: u64,
    pub head_dim: u64,
    pub intermediate_size: u64,
    pub num_hidden_layers: u64,
    pub max_position_embeddings: u64,
    pub num_attention_heads: u64,
}

impl ConfigOverrides {
    pub fn fields(&self) -> [(&'static str, u64); 6] {
        [
            ("hidden_size", self.hidden_size),
            ("head_dim", self.head_dim),
            ("intermediate_size", self.intermediate_size),
            ("num_hidden_layers", self.num_hidden_layers),
            ("max_position_embeddings", self.max_position_embeddings),
            ("num_attention_heads", self.num_attention_heads),
        ]
    }
}

/// A model's `config.json`, kept as an ordered JSON object.
///
/// Only the fields the crate needs are read through typed accessors. Every
/// other key is carried through untouched so the persisted config matches the
/// base model's except for the overridden dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureConfig {
    inner: Map<String, Value>,
}

impl ArchitectureConfig {
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Object(inner) => Ok(Self { inner }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    pub fn from_path(path: &Path) -> crate::TinyModelResult<Self> {
        let text = crate::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(Self::from_value(value)?)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.inner)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.inner.get(field)
    }

    pub fn model_type(&self) -> ConfigResult<&str> {
        match self.inner.get("model_type") {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ConfigError::InvalidField {
                field: "model_type",
                value: other.to_string(),
            }),
            None => Err(ConfigError::MissingField("model_type")),
        }
    }

    pub fn u64_field(&self, field: &'static str) -> ConfigResult<u64> {
        self.opt_u64_field(field)?
            .ok_or(ConfigError::MissingField(field))
    }

    /// `null` is treated the same as an absent field.
    pub fn opt_u64_field(&self, field: &'static str) -> ConfigResult<Option<u64>> {
        match self.inner.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| ConfigError::InvalidField {
                field,
                value: v.to_string(),
            }),
        }
    }

    pub fn bool_field_or(&self, field: &'static str, default: bool) -> ConfigResult<bool> {
        match self.inner.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(v) => Err(ConfigError::InvalidField {
                field,
                value: v.to_string(),
            }),
        }
    }

    pub fn f64_field_or(&self, field: &'static str, default: f64) -> ConfigResult<f64> {
        match self.inner.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| ConfigError::InvalidField {
                field,
                value: v.to_string(),
            }),
        }
    }

    /// Configs that declare an `auto_map` resolve their classes from code shipped
    /// in the model repository.
    pub fn requires_remote_code(&self) -> bool {
        self.inner.contains_key("auto_map")
    }

    /// Sets exactly the overridden fields. Nothing else in the config changes.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        for (field, value) in overrides.fields() {
            crate::trace!("override {field}: {:?} -> {value}", self.inner.get(field));
            self.inner.insert(field.to_owned(), Value::from(value));
        }
    }

    pub fn set_torch_dtype(&mut self, dtype: &str) {
        self.inner
            .insert("torch_dtype".to_owned(), Value::from(dtype.to_owned()));
    }

    /// Replaces `architectures` with the class names the weights were built for.
    pub fn set_architectures(&mut self, architectures: &[&str]) {
        self.inner
            .insert("architectures".to_owned(), Value::from(architectures.to_vec()));
    }

    /// Removes `field`, keeping the order of the remaining keys.
    pub fn remove_field(&mut self, field: &str) -> Option<Value> {
        let removed = self.inner.get(field).cloned()?;
        self.inner = std::mem::take(&mut self.inner)
            .into_iter()
            .filter(|(k, _)| k != field)
            .collect();
        Some(removed)
    }
}

impl fmt::Display for ArchitectureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.inner) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}
