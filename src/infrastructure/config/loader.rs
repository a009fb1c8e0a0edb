use figment::providers::{Env, Serialized};
use figment::Figment;

use crate::domain::errors::ConfigError;
use crate::domain::models::Config;
use crate::services::constraint_engine;

/// Environment variable prefix for overrides, e.g.
/// `NONE_SCHEDULER_CPU_PER_TASK=2`.
const ENV_PREFIX: &str = "NONE_SCHEDULER_";

/// Hierarchical configuration loader. There is no on-disk config file
/// for this scheduler (unlike a long-lived daemon): every value
/// ultimately comes from a CLI flag or an environment fallback.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Merges, in increasing precedence: programmatic defaults,
    /// `NONE_SCHEDULER_*` environment variables, then the config already
    /// assembled from parsed CLI flags (`cli_config`). Validates the
    /// result before returning it.
    pub fn load(cli_config: Config) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(cli_config))
            .extract()
            .map_err(|err| ConfigError::ValidationFailed(err.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.master.is_empty() {
            return Err(ConfigError::MissingMaster);
        }

        if config.cpu_per_task <= 0.0 {
            return Err(ConfigError::InvalidCpuPerTask(config.cpu_per_task));
        }

        if config.mem_per_task <= 0.0 {
            return Err(ConfigError::InvalidMemPerTask(config.mem_per_task));
        }

        constraint_engine::parse(config.constraints.as_deref())?;

        if let Some(container) = &config.container {
            serde_json::from_str::<serde_json::Value>(container)
                .map_err(|err| ConfigError::InvalidContainerJson(err.to_string()))?;
        }

        Ok(())
    }
}
