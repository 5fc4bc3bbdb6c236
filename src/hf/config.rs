//! Configuration for [`HfClient`].

use std::path::PathBuf;

use secrecy::SecretString;

use crate::hf::client::HfClient;

/// Default name of the environment variable consulted for a token.
pub const DEFAULT_ENV_VAR: &str = "HUGGING_FACE_TOKEN";

/// Settings used to build an [`HfClient`].
#[derive(Clone, Debug)]
pub struct HfConfig {
    /// Explicit token.
    /// If `None`, the client will attempt to load it from
    /// [`HfConfig::token_env_var`].
    pub token: Option<SecretString>,

    /// Name of the environment variable used when `token` is `None`.
    pub token_env_var: String,

    /// Where to cache downloaded files. `None` uses the hub's default cache.
    pub cache_dir: Option<PathBuf>,

    /// Emit progress bars during transfers.
    pub progress: bool,

    /// Custom hub endpoint.
    pub endpoint: Option<String>,
}

impl Default for HfConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env_var: DEFAULT_ENV_VAR.to_string(),
            cache_dir: None,
            progress: true,
            endpoint: None,
        }
    }
}

impl HfConfig {
    pub fn build(self) -> crate::hf::HfResult<HfClient> {
        HfClient::new(self)
    }

    /// Sets the token explicitly, bypassing environment-variable lookup.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Changes which environment variable is inspected when no token was set.
    #[must_use]
    pub fn with_token_env_var(mut self, var: impl Into<String>) -> Self {
        self.token_env_var = var.into();
        self
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Uses a non-standard Hugging Face endpoint, such as a mirror.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
