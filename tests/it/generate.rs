use super::*;
use llm_tiny_models::{PretrainedTokenizer, TinyModelError};

#[test]
fn persisted_config_matches_preset() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let generator = fixture.generator();

    for family in ModelFamily::ALL {
        let report = generator.generate(family)?;
        let preset = family.preset();
        let config = read_json(&report.output_dir.join("config.json"))?;

        assert_eq!(config["hidden_size"], preset.hidden_size);
        assert_eq!(config["head_dim"], preset.head_dim);
        assert_eq!(config["intermediate_size"], preset.hidden_size);
        assert_eq!(config["num_hidden_layers"], 2);
        assert_eq!(
            config["max_position_embeddings"],
            preset.max_position_embeddings
        );
        assert_eq!(config["num_attention_heads"], preset.num_attention_heads);
        assert_eq!(config["torch_dtype"], "bfloat16");

        // untouched fields survive as fetched
        let base = base_config(family);
        assert_eq!(config["num_key_value_heads"], base["num_key_value_heads"]);
        assert_eq!(config["vocab_size"], base["vocab_size"]);
    }
    Ok(())
}

#[test]
fn tiny_model_is_smaller_than_base() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    for family in ModelFamily::ALL {
        let report = fixture.generator().generate(family)?;
        println!("{report}");
        let base = report
            .base_num_parameters
            .ok_or_else(|| anyhow!("no base count for {family}"))?;
        assert!(report.num_parameters < base);
    }
    Ok(())
}

#[test]
fn llama_weights_have_expected_shapes() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let report = fixture.generator().generate(ModelFamily::Llama)?;

    let bytes = std::fs::read(report.output_dir.join("model.safetensors"))?;
    let st = SafeTensors::deserialize(&bytes)?;
    let q = st.tensor("model.layers.0.self_attn.q_proj.weight")?;
    assert_eq!(q.dtype(), safetensors::Dtype::BF16);
    assert_eq!(q.shape(), &[16, 64]);
    assert_eq!(st.tensor("model.layers.1.mlp.up_proj.weight")?.shape(), &[64, 64]);
    assert_eq!(
        st.tensor("lm_head.weight")?.shape(),
        &[FIXTURE_VOCAB_SIZE as usize, 64]
    );
    assert!(st.tensor("model.layers.2.mlp.up_proj.weight").is_err());
    let (_, metadata) = SafeTensors::read_metadata(&bytes)?;
    assert_eq!(
        metadata.metadata().as_ref().and_then(|m| m.get("format")),
        Some(&"pt".to_owned())
    );
    Ok(())
}

#[test]
fn reward_model_is_saved_without_lm_head() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let generator = fixture.generator();

    let orm = generator.generate(ModelFamily::QwenOrm)?;
    let names = tensor_names(&orm.output_dir)?;
    assert!(names.iter().all(|n| n != "lm_head.weight"));
    assert!(names.iter().all(|n| !n.starts_with("model.")));
    assert!(names.contains(&"layers.1.self_attn.q_proj.bias".to_owned()));
    assert!(!orm.output_dir.join("generation_config.json").exists());

    for family in [ModelFamily::Llama, ModelFamily::Qwen] {
        let report = generator.generate(family)?;
        let names = tensor_names(&report.output_dir)?;
        assert!(names.contains(&"lm_head.weight".to_owned()));
        assert!(names.contains(&"model.embed_tokens.weight".to_owned()));
        assert!(report.output_dir.join("generation_config.json").is_file());
    }
    Ok(())
}

#[test]
fn saved_config_describes_the_saved_weights() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let generator = fixture.generator();

    for (family, class, with_head) in [
        (ModelFamily::Llama, "LlamaForCausalLM", true),
        (ModelFamily::Qwen, "Qwen2ForCausalLM", true),
        (ModelFamily::QwenOrm, "Qwen2Model", false),
    ] {
        let report = generator.generate(family)?;
        let config = read_json(&report.output_dir.join("config.json"))?;
        let names = tensor_names(&report.output_dir)?;

        assert_eq!(config["architectures"], json!([class]), "{family}");
        assert_eq!(names.contains(&"lm_head.weight".to_owned()), with_head, "{family}");
        let prefixed = names
            .iter()
            .all(|n| n.starts_with("model.") || n == "lm_head.weight");
        assert_eq!(prefixed, with_head, "{family}");
        assert!(names.iter().all(|n| !n.starts_with("score.")));
        if !with_head {
            assert!(config.get("auto_map").is_none());
        }
    }
    Ok(())
}

#[test]
fn saved_tokenizer_round_trips() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let report = fixture.generator().generate(ModelFamily::Qwen)?;

    let tokenizer = PretrainedTokenizer::from_dir(&report.output_dir)?;
    let text = "Let x = 3. What is 2x + 1?\nAnswer: 7";
    let ids = tokenizer.encode(text)?;
    assert_eq!(tokenizer.decode(&ids)?, text);

    let special = read_json(&report.output_dir.join("special_tokens_map.json"))?;
    assert_eq!(special["eos_token"], "<|endoftext|>");
    assert!(special.get("bos_token").is_none());
    Ok(())
}

#[test]
fn reruns_reuse_the_output_dir_with_fresh_weights() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let generator = fixture.generator();
    let name = "model.layers.0.mlp.gate_proj.weight";

    let first = generator.generate(ModelFamily::Llama)?;
    let first_weights = tensor_bytes(&first.output_dir, name)?;
    let second = generator.generate(ModelFamily::Llama)?;
    let second_weights = tensor_bytes(&second.output_dir, name)?;

    assert_eq!(first.output_dir, second.output_dir);
    assert_eq!(
        first.output_dir,
        fixture
            .output_root()
            .join("llama")
            .join("tiny-model-hf")
    );
    assert_ne!(first_weights, second_weights);
    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> crate::Result<()> {
    let fixture = Fixture::new()?;
    let name = "embed_tokens.weight";
    let mut runs = vec![];
    for _ in 0..2 {
        let generator = TinyModelGenerator::new(
            &fixture.registry,
            GeneratorConfig::default()
                .with_output_root(fixture.output_root())
                .with_seed(1234),
        );
        let report = generator.generate(ModelFamily::QwenOrm)?;
        runs.push(tensor_bytes(&report.output_dir, name)?);
    }
    assert_eq!(runs[0], runs[1]);
    Ok(())
}

#[test]
fn unknown_family_fails_before_touching_the_registry() {
    struct UnreachableRegistry;

    impl ModelRegistry for UnreachableRegistry {
        fn fetch_file(
            &self,
            _: &HfRepoId,
            _: &str,
        ) -> llm_tiny_models::hf::HfResult<PathBuf> {
            panic!("registry must not be used")
        }

        fn list_files(&self, _: &HfRepoId) -> llm_tiny_models::hf::HfResult<Vec<String>> {
            panic!("registry must not be used")
        }
    }

    let output_root = tempfile::tempdir().unwrap();
    let generator = TinyModelGenerator::new(
        UnreachableRegistry,
        GeneratorConfig::default().with_output_root(output_root.path()),
    );
    let result = "qwen3"
        .parse::<ModelFamily>()
        .and_then(|family| generator.generate(family));

    assert!(matches!(result, Err(TinyModelError::InvalidFamily(ref t)) if t == "qwen3"));
    assert_eq!(std::fs::read_dir(output_root.path()).unwrap().count(), 0);
}

#[test]
fn missing_base_config_aborts_without_output() -> crate::Result<()> {
    let registry_dir = tempfile::tempdir()?;
    let output_root = tempfile::tempdir()?;
    let generator = TinyModelGenerator::new(
        LocalRegistry::new(registry_dir.path())?,
        GeneratorConfig::default().with_output_root(output_root.path()),
    );

    let err = generator.generate(ModelFamily::Llama).unwrap_err();
    assert!(matches!(err, TinyModelError::Hf(_)));
    assert!(!generator.output_dir(ModelFamily::Llama).exists());
    Ok(())
}
