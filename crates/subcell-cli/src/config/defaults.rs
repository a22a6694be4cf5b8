use subcellular::core::models::model::DEFAULT_CONC_SOURCE;
use subcellular::engine::config::{ExtractionConfig, SamplingConfig, ValidationConfig};

/// Values used when neither the command line nor the config file sets a key.
pub struct DefaultsConfig {
    pub conc_sources: Vec<String>,
    pub max_messages: usize,
    pub parallel_threshold: usize,
    pub max_points: usize,
    pub scale: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            conc_sources: vec![DEFAULT_CONC_SOURCE.to_string()],
            max_messages: ValidationConfig::default().max_messages,
            parallel_threshold: ExtractionConfig::default().parallel_threshold,
            max_points: SamplingConfig::default().max_points,
            scale: 1.0,
        }
    }
}
