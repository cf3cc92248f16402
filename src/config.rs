use crate::model::DEFAULT_CATEGORY;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Categories offered by the TUI picker and filter cycle.
    pub categories: Vec<String>,
    pub default_category: String,
    /// Reject categories outside `categories` at the input boundary.
    pub strict_categories: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            categories: vec![
                DEFAULT_CATEGORY.to_string(),
                "Work".to_string(),
                "Personal".to_string(),
                "Errands".to_string(),
            ],
            default_category: DEFAULT_CATEGORY.to_string(),
            strict_categories: false,
        }
    }
}

impl Config {
    /// Reads `path`, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Config::parse(&data).with_context(|| format!("parsing {:?}", path))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(data)?;
        config.categories = config
            .categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if config.default_category.trim().is_empty() {
            config.default_category = DEFAULT_CATEGORY.to_string();
        }
        if !config.categories.contains(&config.default_category) {
            config.categories.insert(0, config.default_category.clone());
        }
        Ok(config)
    }

    /// Resolves a user-supplied category, applying the default and, when
    /// strict, the allowed list.
    pub fn resolve_category(&self, raw: Option<&str>) -> Result<String> {
        let category = match raw.map(str::trim) {
            None | Some("") => return Ok(self.default_category.clone()),
            Some(c) => c,
        };
        if self.strict_categories && !self.categories.iter().any(|c| c == category) {
            bail!(
                "unknown category {:?} (expected one of: {})",
                category,
                self.categories.join(", ")
            );
        }
        Ok(category.to_string())
    }
}
