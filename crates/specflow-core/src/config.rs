use crate::error::{Result, SpecflowError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `.claude/spec-config.json`.
///
/// Read by the slash commands installed at setup time; the CLI only writes
/// it (on first setup) and re-stamps `specflow_version` on later runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specflow_version: Option<String>,
    #[serde(default = "default_true")]
    pub auto_create_directories: bool,
    #[serde(default = "default_true")]
    pub auto_reference_requirements: bool,
    #[serde(default = "default_true")]
    pub enforce_approval_workflow: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            specflow_version: None,
            auto_create_directories: true,
            auto_reference_requirements: true,
            enforce_approval_workflow: true,
        }
    }
}

impl SpecConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SpecflowError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: SpecConfig = serde_json::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        crate::io::write_text(&path, &data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = SpecConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: SpecConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cfg);
        assert!(parsed.auto_create_directories);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: SpecConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.specflow_version.is_none());
        assert!(parsed.enforce_approval_workflow);
    }

    #[test]
    fn version_not_serialized_when_absent() {
        let json = serde_json::to_string(&SpecConfig::default()).unwrap();
        assert!(!json.contains("specflow_version"));
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = SpecConfig::default();
        cfg.specflow_version = Some("0.1.0".to_string());
        cfg.save(dir.path()).unwrap();

        let loaded = SpecConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_without_setup_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            SpecConfig::load(dir.path()),
            Err(SpecflowError::NotInitialized)
        ));
    }
}
