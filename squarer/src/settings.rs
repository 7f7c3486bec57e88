use config::shared::PipelineConfig;
use config::{Config, LoadConfigError, load_config};
use serde::Deserialize;
use tracing::warn;

/// Configuration of the squarer binary.
#[derive(Debug, Clone, Deserialize)]
pub struct SquarerConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Values to square. Overridable with `APP_INPUTS=1,2,3`.
    #[serde(default = "default_inputs")]
    pub inputs: Vec<i64>,
    /// Stops after this many results, cancelling the rest of the run.
    #[serde(default)]
    pub take: Option<usize>,
}

impl Config for SquarerConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["inputs"];
}

impl Default for SquarerConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            inputs: default_inputs(),
            take: None,
        }
    }
}

fn default_inputs() -> Vec<i64> {
    vec![2, 3]
}

/// Loads the configuration from `./configuration`, falling back to defaults when the
/// directory does not exist.
pub fn load_squarer_config() -> Result<SquarerConfig, LoadConfigError> {
    match load_config::<SquarerConfig>() {
        Err(LoadConfigError::MissingConfigurationDirectory(directory)) => {
            warn!(
                directory = %directory.display(),
                "configuration directory not found, using defaults"
            );
            Ok(SquarerConfig::default())
        }
        result => result,
    }
}
