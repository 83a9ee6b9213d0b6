use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::queue::QueueSettings;
use crate::workflow::{WorkflowSettings, MIN_REJECTION_REASON_CHARS};

/// Main configuration structure for Dramaflow
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DramaflowConfig {
    /// Task queue simulation settings
    pub queue: QueueConfig,
    /// Quality-check review rules
    pub review: ReviewConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Tasks processing at once
    pub max_concurrency: usize,
    pub tick_interval_ms: u64,
    /// Lower bound of the per-tick progress increment
    pub min_increment: u8,
    /// Exclusive upper bound of the per-tick progress increment
    pub max_increment: u8,
    /// Wait between drain and the completion callback
    pub completion_delay_ms: u64,
    /// Probability a processing task fails on a tick
    pub failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReviewConfig {
    pub min_rejection_reason_chars: usize,
    /// Require every episode completed before a translation is submitted
    pub strict_episode_gates: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level filter, overridden by RUST_LOG
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for DramaflowConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig {
                max_concurrency: 5,
                tick_interval_ms: 500,
                min_increment: 5,
                max_increment: 20,
                completion_delay_ms: 1000,
                failure_rate: 0.0,
            },
            review: ReviewConfig {
                min_rejection_reason_chars: MIN_REJECTION_REASON_CHARS,
                strict_episode_gates: false,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}

impl DramaflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (dramaflow.toml, .dramaflow-rc)
    /// 3. Environment variables (prefixed with DRAMAFLOW_, sections split on `__`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as `load`, looking for the configuration files under `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join("dramaflow.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".dramaflow-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("DRAMAFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: DramaflowConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue.max_concurrency == 0 {
            anyhow::bail!("queue.max_concurrency must be at least 1");
        }
        if self.queue.tick_interval_ms == 0 {
            anyhow::bail!("queue.tick_interval_ms must be at least 1");
        }
        if self.queue.min_increment == 0 {
            anyhow::bail!("queue.min_increment must be at least 1 or tasks never finish");
        }
        if self.queue.min_increment > self.queue.max_increment {
            anyhow::bail!(
                "queue.min_increment ({}) exceeds queue.max_increment ({})",
                self.queue.min_increment,
                self.queue.max_increment
            );
        }
        if !(0.0..=1.0).contains(&self.queue.failure_rate) {
            anyhow::bail!("queue.failure_rate must be within 0.0..=1.0");
        }
        Ok(())
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            max_concurrency: self.queue.max_concurrency,
            tick_interval: Duration::from_millis(self.queue.tick_interval_ms),
            min_increment: self.queue.min_increment,
            max_increment: self.queue.max_increment,
            completion_delay: Duration::from_millis(self.queue.completion_delay_ms),
            failure_rate: self.queue.failure_rate,
        }
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            min_rejection_reason_chars: self.review.min_rejection_reason_chars,
            strict_episode_gates: self.review.strict_episode_gates,
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DramaflowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = DramaflowConfig::load_env_file();
        DramaflowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DramaflowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
