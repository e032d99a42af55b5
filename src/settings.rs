use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub input_path: String,
    pub output_path: String,
    pub engine_settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub bank_count: usize,
    pub bank_depth: usize,
}

impl Settings {
    pub fn new(config_paths: Vec<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        for path in config_paths {
            builder = builder.add_source(File::with_name(&path));
        }
        builder.build()?.try_deserialize()
    }
}
