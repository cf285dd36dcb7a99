//! Configuration for toolschema.
//!
//! Loads config from:
//! 1. Global: ~/.config/toolschema/config.toml
//! 2. Per-project: .toolschema/config.toml (overrides global)
//!
//! Example config.toml:
//! ```toml
//! dialect = "claude"
//!
//! [convert]
//! strict = true
//! recursion_depth = 2
//!
//! [separate]
//! media_types = ["image/png", "application/pdf"]
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toolschema::ConvertOptions;

/// Parameter separation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct SeparateConfig {
    /// Media types routed to the caller. Default: any `contentMediaType`
    pub media_types: Option<Vec<String>>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ToolschemaConfig {
    /// Dialect used when a command is given none. Default: openai
    pub dialect: Option<String>,
    pub convert: ConvertOptions,
    pub separate: SeparateConfig,
}

impl ToolschemaConfig {
    /// Load configuration for a project.
    pub fn load(root: &Path) -> Self {
        Self::load_from(Self::global_config_path().as_deref(), root)
    }

    fn load_from(global: Option<&Path>, root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global) = global.and_then(Self::load_file) {
            config = config.merge(global);
        }

        let project_path = root.join(".toolschema").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Dialect name, preferring the command-line choice.
    pub fn dialect_name<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.or(self.dialect.as_deref()).unwrap_or("openai")
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("toolschema").join("config.toml"))
    }

    /// A missing file is silently skipped; a malformed one is logged and skipped.
    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring config: {e}");
                None
            }
        }
    }

    /// Fields set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            dialect: other.dialect.or(self.dialect),
            convert: self.convert.merge(other.convert),
            separate: SeparateConfig {
                media_types: other.separate.media_types.or(self.separate.media_types),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ToolschemaConfig::load_from(None, dir.path());
        assert_eq!(config, ToolschemaConfig::default());
        assert_eq!(config.dialect_name(None), "openai");
    }

    #[test]
    fn project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global").join("config.toml");
        write(
            &global,
            r#"
dialect = "gemini"

[convert]
strict = true
recursion_depth = 5

[separate]
media_types = ["image/png"]
"#,
        );
        write(
            &dir.path().join(".toolschema").join("config.toml"),
            r#"
dialect = "claude"

[convert]
strict = false
"#,
        );

        let config = ToolschemaConfig::load_from(Some(&global), dir.path());
        assert_eq!(config.dialect_name(None), "claude");
        assert_eq!(config.dialect_name(Some("llama")), "llama");
        assert_eq!(config.convert.strict, Some(false));
        assert_eq!(config.convert.recursion_depth, Some(5));
        assert_eq!(
            config.separate.media_types,
            Some(vec!["image/png".to_string()])
        );
    }

    #[test]
    fn malformed_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join(".toolschema").join("config.toml"),
            "[convert\nstrict = ",
        );
        let config = ToolschemaConfig::load_from(None, dir.path());
        assert_eq!(config, ToolschemaConfig::default());
    }
}
