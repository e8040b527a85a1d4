use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::loader::DEFAULT_SOURCE;
use crate::query::{SortKey, SubGrouping};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub contribute: ContributeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost/".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub default_sort: SortKey,
    #[serde(default)]
    pub default_tab: Option<String>,
    #[serde(default)]
    pub sub_grouping: SubGrouping,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ContributeConfig {
    /// Form relay endpoint that accepts a JSON POST. Empty disables relaying.
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("technova").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    pub fn origin(&self) -> Result<Url> {
        Url::parse(&self.site.origin)
            .with_context(|| format!("Invalid site origin: {}", self.site.origin))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn relay_url(&self) -> Option<&str> {
        self.contribute
            .relay_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    pub fn store_path(&self) -> Option<PathBuf> {
        self.contribute
            .store_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| dirs::data_dir().map(|p| p.join("technova").join("contributions.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.source, "data.json");
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.display.default_sort, SortKey::NameAsc);
        assert_eq!(config.display.sub_grouping, SubGrouping::Popular);
        assert!(config.relay_url().is_none());
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse(
            r#"
            [display]
            default_sort = "name-desc"
            sub_grouping = "domain"

            [search]
            debounce_ms = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.display.default_sort, SortKey::NameDesc);
        assert_eq!(config.display.sub_grouping, SubGrouping::Domain);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.site.origin, "http://localhost/");
    }

    #[test]
    fn test_blank_relay_is_disabled() {
        let config = Config::parse("[contribute]\nrelay_url = \"  \"\n").unwrap();
        assert!(config.relay_url().is_none());
    }

    #[test]
    fn test_store_path_override() {
        let config = Config::parse("[contribute]\nstore_path = \"/tmp/c.json\"\n").unwrap();
        assert_eq!(config.store_path(), Some(PathBuf::from("/tmp/c.json")));

        let config = Config::parse("[contribute]\nstore_path = \"\"\n").unwrap();
        assert_ne!(config.store_path(), Some(PathBuf::new()));
    }

    #[test]
    fn test_invalid_origin() {
        let config = Config::parse("[site]\norigin = \"not a url\"\n").unwrap();
        assert!(config.origin().is_err());
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        assert!(Config::parse("[display]\ndefault_sort = \"stars\"\n").is_err());
    }
}
