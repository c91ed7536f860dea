use std::fs;
use std::path::Path;

use crate::model::EngineConfig;

/// Read sprig.toml from the data directory. A missing file means defaults;
/// a corrupt file warns and falls back to defaults rather than blocking the
/// user's data.
pub fn read_config(dir: &Path) -> EngineConfig {
    let path = dir.join("sprig.toml");
    let Ok(content) = fs::read_to_string(&path) else {
        return EngineConfig::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: could not parse {}: {}", path.display(), e);
            EngineConfig::default()
        }
    }
}
