use std::path::PathBuf;

use dotenvy::dotenv;
use hf_hub::{
    api::sync::{Api, ApiBuilder, ApiRepo},
    Cache, Repo, RepoType,
};
use secrecy::ExposeSecret;

use crate::hf::{config::HfConfig, id::HfRepoId, HfResult, ModelRegistry};

/// Blocking Hugging Face Hub client.
#[derive(Debug)]
pub struct HfClient {
    api: Api,
}

impl HfClient {
    pub fn new(config: HfConfig) -> HfResult<Self> {
        let cache = match config.cache_dir {
            Some(dir) => Cache::new(dir),
            None => Cache::default(), // Downloads to Path: "~/.cache/huggingface/hub/"
        };

        let token = match config.token {
            Some(token) => Some(token.expose_secret().to_owned()),
            None => {
                dotenv().ok();
                match dotenvy::var(&config.token_env_var) {
                    Ok(token) => Some(token),
                    Err(_) => {
                        crate::debug!(
                            "{} not found in dotenv, nor was it set manually",
                            config.token_env_var
                        );
                        None
                    }
                }
            }
        };

        let mut builder = ApiBuilder::from_cache(cache)
            .with_progress(config.progress)
            .with_token(token);

        if let Some(endpoint) = config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        Ok(HfClient {
            api: builder.build()?,
        })
    }

    pub fn api_repo(&self, repo_id: &HfRepoId) -> ApiRepo {
        self.api
            .repo(Repo::new(repo_id.repo_id().to_owned(), RepoType::Model))
    }
}

impl ModelRegistry for HfClient {
    fn fetch_file(&self, repo_id: &HfRepoId, file_name: &str) -> HfResult<PathBuf> {
        crate::debug!("fetching {file_name} from {repo_id}");
        Ok(self.api_repo(repo_id).get(file_name)?)
    }

    fn list_files(&self, repo_id: &HfRepoId) -> HfResult<Vec<String>> {
        let info = self.api_repo(repo_id).info()?;
        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }
}
