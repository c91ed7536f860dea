use serde::{Deserialize, Serialize};

/// What to do when an indent change or move wants a depth for which no valid
/// parent exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Drop the item back to the nearest attachable depth (top level if
    /// nothing else works). Depth without a parent link never survives.
    #[default]
    Detach,
    /// Keep the requested visual depth with no parent link (display-only
    /// orphan).
    Keep,
}

/// Configuration from sprig.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum nesting depth (0 = flat list).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
    /// Hide effectively-completed items in rendered views.
    #[serde(default)]
    pub hide_completed: bool,
    #[serde(default)]
    pub save: SaveConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: default_max_depth(),
            orphan_policy: OrphanPolicy::default(),
            hide_completed: false,
            save: SaveConfig::default(),
        }
    }
}

/// Debounce windows for scheduled saves, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConfig {
    #[serde(default = "default_text_debounce_ms")]
    pub text_debounce_ms: u64,
    #[serde(default = "default_structural_debounce_ms")]
    pub structural_debounce_ms: u64,
}

impl Default for SaveConfig {
    fn default() -> Self {
        SaveConfig {
            text_debounce_ms: default_text_debounce_ms(),
            structural_debounce_ms: default_structural_debounce_ms(),
        }
    }
}

/// The product clamps visual depth to two sublevels.
fn default_max_depth() -> usize {
    2
}

fn default_text_debounce_ms() -> u64 {
    200
}

fn default_structural_debounce_ms() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_toml() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.orphan_policy, OrphanPolicy::Detach);
        assert!(!config.hide_completed);
        assert_eq!(config.save.text_debounce_ms, 200);
        assert_eq!(config.save.structural_debounce_ms, 50);
    }

    #[test]
    fn parses_partial_config() {
        let config: EngineConfig = toml::from_str(
            r#"
max_depth = 3
orphan_policy = "keep"

[save]
text_debounce_ms = 500
"#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.orphan_policy, OrphanPolicy::Keep);
        assert_eq!(config.save.text_debounce_ms, 500);
        assert_eq!(config.save.structural_debounce_ms, 50);
    }
}
