// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;
use url::Url;

use crate::aggregate::{TOP_DEVELOPERS, TOP_SECTORS, TOP_STATES};
use crate::fetch::{fallback::DEFAULT_SEED, DatasetPaths, LoadOptions, MIN_BODY_BYTES};

pub const ENV_BASE_URL: &str = "GRIDWATCH_BASE_URL";
pub const ENV_DATA_DIR: &str = "GRIDWATCH_DATA_DIR";
pub const ENV_SEED: &str = "GRIDWATCH_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Fetch the CSV files from a web server.
    Http { base_url: Url },
    /// Read the CSV files from a directory (the site's `public/` folder).
    Files { root: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Files {
            root: PathBuf::from("public"),
        }
    }
}

/// How many groups each chart keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopConfig {
    pub states: usize,
    pub sectors: usize,
    pub developers: usize,
}

impl Default for TopConfig {
    fn default() -> Self {
        Self {
            states: TOP_STATES,
            sectors: TOP_SECTORS,
            developers: TOP_DEVELOPERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub min_body_bytes: usize,
    pub fallback_seed: u64,
    pub source: SourceConfig,
    pub etim: DatasetPaths,
    pub iig: DatasetPaths,
    pub top: TopConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_body_bytes: MIN_BODY_BYTES,
            fallback_seed: DEFAULT_SEED,
            source: SourceConfig::default(),
            etim: DatasetPaths::etim(),
            iig: DatasetPaths::iig(),
            top: TopConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults, then `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                info!(path = %p.display(), "loading configuration");
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `GRIDWATCH_*` overrides read through `lookup`.
    /// A data directory wins over a base URL when both are set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_BASE_URL) {
            let base_url =
                Url::parse(&raw).with_context(|| format!("{} is not a URL: {}", ENV_BASE_URL, raw))?;
            self.source = SourceConfig::Http { base_url };
        }
        if let Some(root) = lookup(ENV_DATA_DIR) {
            self.source = SourceConfig::Files {
                root: PathBuf::from(root),
            };
        }
        if let Some(raw) = lookup(ENV_SEED) {
            self.fallback_seed = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be an unsigned integer, got {}", ENV_SEED, raw))?;
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            etim: self.etim.clone(),
            iig: self.iig.clone(),
            min_body_bytes: self.min_body_bytes,
            fallback_seed: self.fallback_seed,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("writing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            min_body_bytes = 10

            [source]
            kind = "http"
            base_url = "https://example.org/"

            [top]
            developers = 3
            "#,
        )?;
        assert_eq!(config.min_body_bytes, 10);
        assert_eq!(config.top.developers, 3);
        assert_eq!(config.top.states, TOP_STATES);
        assert_eq!(config.etim, DatasetPaths::etim());
        assert!(matches!(config.source, SourceConfig::Http { .. }));
        Ok(())
    }

    #[test]
    fn save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("gridwatch.toml");
        let mut config = Config::default();
        config.fallback_seed = 99;
        config.save(&path)?;
        assert_eq!(Config::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn env_overrides() -> Result<()> {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://dash.example.org/app/"),
            (ENV_SEED, "12"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))?;

        assert_eq!(config.fallback_seed, 12);
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: Url::parse("https://dash.example.org/app/")?
            }
        );
        Ok(())
    }

    #[test]
    fn bad_seed_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == ENV_SEED).then(|| "abc".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SEED));
    }

    #[test]
    fn invalid_toml_names_the_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.toml");
        fs::write(&path, "min_body_bytes = [")?;
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
        Ok(())
    }
}
