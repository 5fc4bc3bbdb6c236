use std::{
    fmt::{self, Write},
    path::{Path, PathBuf},
};

use indenter::indented;

use crate::{
    config_json::{ArchitectureConfig, ConfigError, CONFIG_FILE_NAME},
    hf::{HfRepoId, ModelRegistry},
    model::{ArchitectureLayout, ModelHead, TinyModel, WeightInit},
    preset::{ModelFamily, TinyModelPreset, DEFAULT_OUTPUT_ROOT},
    tokenizer::PretrainedTokenizer,
    TinyModelResult,
};

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_root: PathBuf,
    /// Accept configs that resolve their classes from code in the model repository.
    pub trust_remote_code: bool,
    /// Fixed seed for reproducible weights. `None` draws a fresh seed each run.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            trust_remote_code: true,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    #[must_use]
    pub fn with_trust_remote_code(mut self, trust_remote_code: bool) -> Self {
        self.trust_remote_code = trust_remote_code;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub family: ModelFamily,
    pub output_dir: PathBuf,
    pub num_parameters: u64,
    /// Parameter count of the full-size model, when its config could be read.
    pub base_num_parameters: Option<u64>,
}

impl GenerationReport {
    pub fn params_millions(&self) -> f64 {
        self.num_parameters as f64 / 1_000_000.0
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GenerationReport:")?;
        let mut f = indented(f);
        writeln!(f, "family: {}", self.family)?;
        writeln!(f, "output_dir: {}", self.output_dir.display())?;
        writeln!(f, "# of params: {:.1}M", self.params_millions())?;
        match self.base_num_parameters {
            Some(n) => writeln!(f, "base # of params: {:.1}M", n as f64 / 1_000_000.0),
            None => writeln!(f, "base # of params: unavailable"),
        }
    }
}

/// Shrinks a base model family into a tiny random checkpoint.
#[derive(Debug)]
pub struct TinyModelGenerator<R: ModelRegistry> {
    registry: R,
    config: GeneratorConfig,
}

impl<R: ModelRegistry> TinyModelGenerator<R> {
    pub fn new(registry: R, config: GeneratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn output_dir(&self, family: ModelFamily) -> PathBuf {
        family.preset().output_dir(&self.config.output_root)
    }

    /// Fetches the full-size `config.json` of the preset's base model.
    pub fn load_base_config(
        &self,
        preset: &TinyModelPreset,
    ) -> TinyModelResult<ArchitectureConfig> {
        let repo_id = HfRepoId::try_new(preset.base_model_id).map_err(crate::hf::HfError::from)?;
        let path = self.registry.fetch_file(&repo_id, CONFIG_FILE_NAME)?;
        let config = ArchitectureConfig::from_path(&path)?;

        if config.requires_remote_code() && !self.config.trust_remote_code {
            return Err(ConfigError::RemoteCodeNotTrusted {
                repo_id: repo_id.to_string(),
            }
            .into());
        }
        Ok(config)
    }

    /// Applies the preset overrides and materializes the random model.
    pub fn build_model(
        &self,
        family: ModelFamily,
        mut config: ArchitectureConfig,
    ) -> TinyModelResult<TinyModel> {
        config.apply_overrides(&family.preset().overrides());
        crate::info!("new config {config}");

        let mut init = WeightInit::new(self.config.seed);
        TinyModel::from_config(config, head_for(family), &mut init)
    }

    /// Runs the full sequence for one family and writes model and tokenizer
    /// artifacts into its output directory.
    pub fn generate(&self, family: ModelFamily) -> TinyModelResult<GenerationReport> {
        let preset = family.preset();
        let output_dir = self.output_dir(family);
        crate::info!(
            "generating tiny {family} model from {} into {}",
            preset.base_model_id,
            output_dir.display()
        );

        let base_config = self.load_base_config(preset)?;
        let base_num_parameters = base_num_parameters(family, &base_config);

        let mut model = self.build_model(family, base_config)?;
        let num_parameters = model.num_parameters();
        crate::info!("# of params: {:.1}M", num_parameters as f64 / 1_000_000.0);

        model.to_bf16();
        model.save_pretrained(&output_dir)?;

        self.save_tokenizer(preset, &output_dir)?;

        Ok(GenerationReport {
            family,
            output_dir,
            num_parameters,
            base_num_parameters,
        })
    }

    fn save_tokenizer(&self, preset: &TinyModelPreset, output_dir: &Path) -> TinyModelResult<()> {
        let repo_id = HfRepoId::try_new(preset.base_model_id).map_err(crate::hf::HfError::from)?;
        PretrainedTokenizer::from_registry(&self.registry, &repo_id)?.save_pretrained(output_dir)
    }
}

fn base_num_parameters(family: ModelFamily, base_config: &ArchitectureConfig) -> Option<u64> {
    match ArchitectureLayout::from_config(base_config, head_for(family)) {
        Ok(layout) => Some(layout.num_parameters()),
        Err(e) => {
            crate::warn!("could not count parameters of the base {family} model: {e}");
            None
        }
    }
}

fn head_for(family: ModelFamily) -> ModelHead {
    if family.is_reward_model() {
        ModelHead::Base
    } else {
        ModelHead::CausalLm
    }
}
