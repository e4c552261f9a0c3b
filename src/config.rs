use crate::error::Result;
use crate::highlight::HighlightMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hard cap on rendered result lines per run.
    #[serde(default = "default_max_result_lines")]
    pub max_result_lines: usize,

    /// Delay before retrying a search that superseded an in-flight one.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    #[serde(default)]
    pub highlight: HighlightMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Directory names never descended into, matched against path segments.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Files larger than this are skipped without being opened.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

fn default_max_result_lines() -> usize {
    100
}
fn default_restart_delay_ms() -> u64 {
    50
}
fn default_max_file_size_mb() -> u64 {
    5
}
fn default_excluded_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        ".svn".to_string(),
        "__pycache__".to_string(),
        "__trash".to_string(),
    ]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_result_lines: default_max_result_lines(),
            restart_delay_ms: default_restart_delay_ms(),
            highlight: HighlightMode::default(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

impl SearchConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

impl IgnoreConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::find_config_path() {
            let content = fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("searchlite/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".searchlite.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".searchlite.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SearchLiteError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_limits() {
        let config = Config::default();
        assert_eq!(config.search.max_result_lines, 100);
        assert_eq!(config.search.restart_delay_ms, 50);
        assert_eq!(config.ignore.max_file_size_mb, 5);
        assert_eq!(config.ignore.max_file_size_bytes(), 5 * 1024 * 1024);
        assert!(config.ignore.excluded_dirs.contains(&".git".to_string()));
        assert_eq!(config.search.highlight, HighlightMode::Off);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            max_result_lines = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.search.max_result_lines, 10);
        assert_eq!(config.search.restart_delay_ms, 50);
        assert_eq!(config.ignore.max_file_size_mb, 5);
    }

    #[test]
    fn highlight_modes_round_trip_through_toml() {
        let config: Config = toml::from_str(
            r#"
            [search]
            highlight = "detect"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.highlight, HighlightMode::Detect);

        let config: Config = toml::from_str(
            r#"
            [search.highlight]
            fixed = "Rust"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.highlight, HighlightMode::Fixed("Rust".into()));
    }

    #[test]
    fn save_writes_parseable_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        Config::default().save(&path).unwrap();

        let reloaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.search.max_result_lines, 100);
    }
}
