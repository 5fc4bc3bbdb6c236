//! Tensor layout of decoder-only transformers in the Hugging Face naming scheme.
//!
//! The layout is derived purely from a config, so it can describe both the
//! tiny model that gets materialized and the full-size base model that never
//! does (for parameter counting).

use crate::config_json::{ArchitectureConfig, ConfigError, ConfigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Llama,
    Qwen2,
}

impl ModelKind {
    pub fn from_model_type(model_type: &str) -> ConfigResult<Self> {
        match model_type {
            "llama" => Ok(ModelKind::Llama),
            "qwen2" => Ok(ModelKind::Qwen2),
            other => Err(ConfigError::UnsupportedArchitecture(other.to_owned())),
        }
    }

    /// The `transformers` class that loads weights laid out for `head`.
    pub fn class_name(&self, head: ModelHead) -> &'static str {
        match (self, head) {
            (ModelKind::Llama, ModelHead::CausalLm) => "LlamaForCausalLM",
            (ModelKind::Llama, ModelHead::Base) => "LlamaModel",
            (ModelKind::Qwen2, ModelHead::CausalLm) => "Qwen2ForCausalLM",
            (ModelKind::Qwen2, ModelHead::Base) => "Qwen2Model",
        }
    }
}

/// Which head sits on top of the decoder stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelHead {
    /// Next-token prediction head; the backbone lives under `model.`.
    CausalLm,
    /// Bare decoder stack, saved without a prefix.
    Base,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorInit {
    Normal,
    Zeros,
    Ones,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub init: TensorInit,
}

impl TensorSpec {
    fn new(name: String, shape: Vec<usize>, init: TensorInit) -> Self {
        Self { name, shape, init }
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureLayout {
    pub kind: ModelKind,
    pub head: ModelHead,
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub intermediate_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub num_key_value_heads: usize,
    pub head_dim: usize,
    pub qkv_bias: bool,
    pub o_bias: bool,
    pub mlp_bias: bool,
    pub tie_word_embeddings: bool,
    pub initializer_range: f64,
}

impl ArchitectureLayout {
    pub fn from_config(config: &ArchitectureConfig, head: ModelHead) -> ConfigResult<Self> {
        let kind = ModelKind::from_model_type(config.model_type()?)?;

        let hidden_size = config.u64_field("hidden_size")? as usize;
        let num_attention_heads = config.u64_field("num_attention_heads")? as usize;
        if num_attention_heads == 0 {
            return Err(ConfigError::InvalidField {
                field: "num_attention_heads",
                value: "0".into(),
            });
        }

        let num_key_value_heads = config
            .opt_u64_field("num_key_value_heads")?
            .map(|n| n as usize)
            .unwrap_or(num_attention_heads);
        if num_key_value_heads == 0 || num_attention_heads % num_key_value_heads != 0 {
            return Err(ConfigError::InvalidField {
                field: "num_key_value_heads",
                value: format!(
                    "{num_key_value_heads} does not divide num_attention_heads {num_attention_heads}"
                ),
            });
        }

        let head_dim = match config.opt_u64_field("head_dim")? {
            Some(head_dim) => head_dim as usize,
            None if hidden_size % num_attention_heads == 0 => hidden_size / num_attention_heads,
            None => {
                return Err(ConfigError::InvalidField {
                    field: "hidden_size",
                    value: format!(
                        "{hidden_size} is not divisible by num_attention_heads {num_attention_heads}"
                    ),
                })
            }
        };

        let (qkv_bias, o_bias, mlp_bias) = match kind {
            ModelKind::Llama => {
                let attention_bias = config.bool_field_or("attention_bias", false)?;
                (
                    attention_bias,
                    attention_bias,
                    config.bool_field_or("mlp_bias", false)?,
                )
            }
            ModelKind::Qwen2 => (true, false, false),
        };

        Ok(Self {
            kind,
            head,
            vocab_size: config.u64_field("vocab_size")? as usize,
            hidden_size,
            intermediate_size: config.u64_field("intermediate_size")? as usize,
            num_hidden_layers: config.u64_field("num_hidden_layers")? as usize,
            num_attention_heads,
            num_key_value_heads,
            head_dim,
            qkv_bias,
            o_bias,
            mlp_bias,
            tie_word_embeddings: config.bool_field_or("tie_word_embeddings", false)?,
            initializer_range: config.f64_field_or("initializer_range", 0.02)?,
        })
    }

    fn backbone_prefix(&self) -> &'static str {
        match self.head {
            ModelHead::CausalLm => "model.",
            ModelHead::Base => "",
        }
    }

    /// Every persisted tensor, in checkpoint order.
    pub fn tensors(&self) -> Vec<TensorSpec> {
        let p = self.backbone_prefix();
        let h = self.hidden_size;
        let q_out = self.num_attention_heads * self.head_dim;
        let kv_out = self.num_key_value_heads * self.head_dim;
        let ff = self.intermediate_size;

        let mut specs = vec![TensorSpec::new(
            format!("{p}embed_tokens.weight"),
            vec![self.vocab_size, h],
            TensorInit::Normal,
        )];

        for i in 0..self.num_hidden_layers {
            let l = format!("{p}layers.{i}.");
            let mut linear = |name: &str, out: usize, inp: usize, bias: bool| {
                specs.push(TensorSpec::new(
                    format!("{l}{name}.weight"),
                    vec![out, inp],
                    TensorInit::Normal,
                ));
                if bias {
                    specs.push(TensorSpec::new(
                        format!("{l}{name}.bias"),
                        vec![out],
                        TensorInit::Zeros,
                    ));
                }
            };
            linear("self_attn.q_proj", q_out, h, self.qkv_bias);
            linear("self_attn.k_proj", kv_out, h, self.qkv_bias);
            linear("self_attn.v_proj", kv_out, h, self.qkv_bias);
            linear("self_attn.o_proj", h, q_out, self.o_bias);
            linear("mlp.gate_proj", ff, h, self.mlp_bias);
            linear("mlp.up_proj", ff, h, self.mlp_bias);
            linear("mlp.down_proj", h, ff, self.mlp_bias);

            for norm in ["input_layernorm", "post_attention_layernorm"] {
                specs.push(TensorSpec::new(
                    format!("{l}{norm}.weight"),
                    vec![h],
                    TensorInit::Ones,
                ));
            }
        }

        specs.push(TensorSpec::new(
            format!("{p}norm.weight"),
            vec![h],
            TensorInit::Ones,
        ));

        if self.head == ModelHead::CausalLm && !self.tie_word_embeddings {
            specs.push(TensorSpec::new(
                "lm_head.weight".to_owned(),
                vec![self.vocab_size, h],
                TensorInit::Normal,
            ));
        }

        specs
    }

    /// Parameter count without materializing any weights. Tied embeddings count once.
    pub fn num_parameters(&self) -> u64 {
        self.tensors().iter().map(|t| t.numel() as u64).sum()
    }
}
