// cargo run --bin make_tiny_model -- --model_type qwen
use std::path::PathBuf;

use clap::Parser;
use llm_tiny_models::{
    GeneratorConfig, HfConfig, LocalRegistry, LoggingConfig, LoggingConfigTrait,
    ModelFamily, TinyModelGenerator, preset::DEFAULT_OUTPUT_ROOT,
};

#[derive(Debug, Parser)]
#[command(name = "make_tiny_model", about = "Create a tiny model for testing.")]
struct Cli {
    #[arg(long = "model_type", value_enum)]
    model_type: ModelFamily,

    /// Each family is written to <output_root>/<model_type>/tiny-model-hf.
    #[arg(long = "output_root", default_value = DEFAULT_OUTPUT_ROOT)]
    output_root: PathBuf,

    /// Read configs and tokenizers from a local mirror instead of the Hub.
    #[arg(long = "local_registry")]
    local_registry: Option<PathBuf>,

    #[arg(long = "hf_token")]
    hf_token: Option<String>,

    #[arg(long = "seed")]
    seed: Option<u64>,

    #[arg(long = "log_level", default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new()
        .logger_name("make_tiny_model")
        .log_level(cli.log_level);
    logging.load_logger()?;

    let mut config = GeneratorConfig::default().with_output_root(&cli.output_root);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let report = match &cli.local_registry {
        Some(root) => {
            TinyModelGenerator::new(LocalRegistry::new(root)?, config).generate(cli.model_type)?
        }
        None => {
            let mut hf = HfConfig::default();
            if let Some(token) = cli.hf_token {
                hf = hf.with_token(token);
            }
            TinyModelGenerator::new(hf.build()?, config).generate(cli.model_type)?
        }
    };

    println!("{report}");
    Ok(())
}
