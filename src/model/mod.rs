pub mod architecture;
pub mod init;

use std::{collections::HashMap, fmt, path::Path};

use half::bf16;
use safetensors::{serialize_to_file, tensor::TensorView, Dtype};
use serde_json::{json, Map, Value};

pub use self::{
    architecture::{ArchitectureLayout, ModelHead, ModelKind, TensorInit, TensorSpec},
    init::WeightInit,
};
use crate::{
    config_json::{ArchitectureConfig, CONFIG_FILE_NAME},
    TinyModelError, TinyModelResult,
};

pub const WEIGHTS_FILE_NAME: &str = "model.safetensors";
pub const GENERATION_CONFIG_FILE_NAME: &str = "generation_config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDtype {
    F32,
    BF16,
}

impl ModelDtype {
    pub fn torch_dtype(&self) -> &'static str {
        match self {
            ModelDtype::F32 => "float32",
            ModelDtype::BF16 => "bfloat16",
        }
    }
}

#[derive(Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    BF16(Vec<bf16>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::BF16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            TensorData::F32(v) => v.clone(),
            TensorData::BF16(v) => v.iter().map(|x| x.to_f32()).collect(),
        }
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            TensorData::F32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            TensorData::BF16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        }
    }
}

impl fmt::Debug for TensorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorData::F32(v) => write!(f, "TensorData::F32(len={})", v.len()),
            TensorData::BF16(v) => write!(f, "TensorData::BF16(len={})", v.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: TensorData,
}

impl Tensor {
    pub fn new(name: String, shape: Vec<usize>, data: TensorData) -> TinyModelResult<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(TinyModelError::TensorShape {
                name,
                shape,
                len: data.len(),
                expected,
            });
        }
        Ok(Self { name, shape, data })
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    fn materialize(spec: TensorSpec, std: f32, init: &mut WeightInit) -> TinyModelResult<Self> {
        let numel = spec.numel();
        let values = match spec.init {
            TensorInit::Normal => init.normal(numel, std),
            TensorInit::Zeros => vec![0.0; numel],
            TensorInit::Ones => vec![1.0; numel],
        };
        Self::new(spec.name, spec.shape, TensorData::F32(values))
    }
}

/// A randomly initialized model built from a (shrunk) architecture config.
#[derive(Debug, Clone)]
pub struct TinyModel {
    config: ArchitectureConfig,
    layout: ArchitectureLayout,
    tensors: Vec<Tensor>,
    dtype: ModelDtype,
}

impl TinyModel {
    /// Builds the model described by `config` with freshly initialized f32 weights.
    ///
    /// Linear and embedding weights are drawn from N(0, `initializer_range`),
    /// biases start at zero and norm weights at one.
    pub fn from_config(
        config: ArchitectureConfig,
        head: ModelHead,
        init: &mut WeightInit,
    ) -> TinyModelResult<Self> {
        let layout = ArchitectureLayout::from_config(&config, head)?;
        let std = layout.initializer_range as f32;
        crate::debug!(
            "materializing {:?} {:?} with {} layers",
            layout.kind,
            layout.head,
            layout.num_hidden_layers
        );
        let tensors = layout
            .tensors()
            .into_iter()
            .map(|spec| Tensor::materialize(spec, std, init))
            .collect::<TinyModelResult<Vec<_>>>()?;

        Ok(Self {
            config,
            layout,
            tensors,
            dtype: ModelDtype::F32,
        })
    }

    pub fn config(&self) -> &ArchitectureConfig {
        &self.config
    }

    pub fn layout(&self) -> &ArchitectureLayout {
        &self.layout
    }

    pub fn head(&self) -> ModelHead {
        self.layout.head
    }

    pub fn dtype(&self) -> ModelDtype {
        self.dtype
    }

    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    pub fn tensor(&self, name: &str) -> Option<&Tensor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    pub fn num_parameters(&self) -> u64 {
        self.tensors.iter().map(|t| t.numel() as u64).sum()
    }

    /// Converts every tensor to bfloat16 in place.
    pub fn to_bf16(&mut self) {
        for tensor in &mut self.tensors {
            if let TensorData::F32(values) = &tensor.data {
                tensor.data = TensorData::BF16(values.iter().map(|&x| bf16::from_f32(x)).collect());
            }
        }
        self.dtype = ModelDtype::BF16;
    }

    /// The config as it is written next to the weights.
    ///
    /// `architectures` names the class the tensors were laid out for. A base
    /// stack no longer matches any remote class, so `auto_map` is dropped.
    pub fn resolved_config(&self) -> ArchitectureConfig {
        let mut config = self.config.clone();
        config.set_architectures(&[self.layout.kind.class_name(self.layout.head)]);
        if self.layout.head == ModelHead::Base && config.remove_field("auto_map").is_some() {
            crate::debug!("dropped auto_map from the saved base model config");
        }
        config.set_torch_dtype(self.dtype.torch_dtype());
        config
    }

    /// Only produced for models with a language-model head.
    pub fn generation_config(&self) -> Option<Value> {
        if self.head() != ModelHead::CausalLm {
            return None;
        }
        let mut out = Map::new();
        out.insert("_from_model_config".to_owned(), json!(true));
        for key in ["bos_token_id", "eos_token_id", "pad_token_id"] {
            match self.config.get(key) {
                None | Some(Value::Null) => {}
                Some(v) => {
                    out.insert(key.to_owned(), v.clone());
                }
            }
        }
        Some(Value::Object(out))
    }

    /// Writes `config.json`, `model.safetensors` and, for causal-LM models,
    /// `generation_config.json` into `dir`, overwriting existing files.
    pub fn save_pretrained(&self, dir: &Path) -> TinyModelResult<()> {
        crate::fs::ensure_dir(dir)?;

        crate::fs::write_json(
            &dir.join(CONFIG_FILE_NAME),
            self.resolved_config().as_map(),
        )?;

        if let Some(generation_config) = self.generation_config() {
            crate::fs::write_json(&dir.join(GENERATION_CONFIG_FILE_NAME), &generation_config)?;
        }

        let dtype = match self.dtype {
            ModelDtype::F32 => Dtype::F32,
            ModelDtype::BF16 => Dtype::BF16,
        };
        let buffers: Vec<(&Tensor, Vec<u8>)> = self
            .tensors
            .iter()
            .map(|t| (t, t.data.to_le_bytes()))
            .collect();
        let views = buffers
            .iter()
            .map(|(t, bytes)| -> TinyModelResult<(String, TensorView<'_>)> {
                Ok((t.name.clone(), TensorView::new(dtype, t.shape.clone(), bytes)?))
            })
            .collect::<TinyModelResult<Vec<_>>>()?;

        let metadata: HashMap<String, String> =
            HashMap::from([("format".to_owned(), "pt".to_owned())]);
        let weights_path = dir.join(WEIGHTS_FILE_NAME);
        serialize_to_file(views, &Some(metadata), &weights_path)?;

        crate::info!("saved model weights to {}", weights_path.display());
        Ok(())
    }
}
