use std::path::PathBuf;

use colorful::Colorful;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: tracing::Level,
    pub logging_enabled: bool,
    pub logger_name: String,
    /// When set, logs are also written to an hourly rolling file in this directory.
    pub log_dir: Option<PathBuf>,
    pub _tracing_guard: Option<std::sync::Arc<tracing::subscriber::DefaultGuard>>,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            logging_enabled: true,
            logger_name: "llm_tiny_models".to_string(),
            log_dir: None,
            _tracing_guard: None,
        }
    }
}

impl LoggingConfig {
    pub fn load_logger(&mut self) -> crate::TinyModelResult<()> {
        self._tracing_guard = if self.logging_enabled {
            Some(std::sync::Arc::new(self.create_logger()?))
        } else {
            None
        };

        println!(
            "{}",
            format!("Starting {} Logger", self.logger_name)
                .color(colorful::RGB::new(0, 139, 248))
                .bold()
        );

        Ok(())
    }

    fn create_logger(&mut self) -> crate::TinyModelResult<tracing::subscriber::DefaultGuard> {
        let file_layer = match &self.log_dir {
            Some(log_dir) => {
                crate::fs::ensure_dir(log_dir)?;
                let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
                    .rotation(tracing_appender::rolling::Rotation::HOURLY)
                    .max_log_files(6)
                    .filename_prefix(&self.logger_name)
                    .filename_suffix("log")
                    .build(log_dir)
                    .map_err(|e| crate::fs::FileSystemError::IoError {
                        operation: "create log file",
                        path: log_dir.clone(),
                        message: e.to_string(),
                    })?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_ansi(false)
                        .with_writer(file_appender),
                )
            }
            None => None,
        };

        let filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(self.level.into())
            .parse_lossy("");

        let terminal_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(false)
            .with_writer(std::io::stdout);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(terminal_layer);

        Ok(tracing::subscriber::set_default(subscriber))
    }
}

pub trait LoggingConfigTrait {
    fn logging_config_mut(&mut self) -> &mut LoggingConfig;

    fn logging_enabled(mut self, enabled: bool) -> Self
    where
        Self: Sized,
    {
        self.logging_config_mut().logging_enabled = enabled;
        self
    }

    fn logger_name<S: Into<String>>(mut self, logger_name: S) -> Self
    where
        Self: Sized,
    {
        self.logging_config_mut().logger_name = logger_name.into();
        self
    }

    fn log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self
    where
        Self: Sized,
    {
        self.logging_config_mut().log_dir = Some(log_dir.into());
        self
    }

    /// Use DEBUG to log variables or decisions, INFO for milestones such as
    /// artifacts being written.
    fn log_level(mut self, level: tracing::Level) -> Self
    where
        Self: Sized,
    {
        self.logging_config_mut().level = level;
        self
    }
}

impl LoggingConfigTrait for LoggingConfig {
    fn logging_config_mut(&mut self) -> &mut LoggingConfig {
        self
    }
}
