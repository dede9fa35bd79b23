//! `cellcheck.toml` configuration.
//!
//! ```toml
//! strict = true
//! concurrent = false
//! log_level = "info"
//!
//! [messages]
//! minimum-constraint = "{column_name} is below {constraint} in row {row_number}"
//! ```

use anyhow::{Context, Result, anyhow};
use cellcheck_core::InspectOptions;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cellcheck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Coerce with the exact lexical grammar of each type
    pub strict: bool,
    /// Validate columns on parallel tasks
    pub concurrent: bool,
    /// trace, debug, info, warn or error
    pub log_level: Option<String>,
    /// Message templates keyed by finding code
    pub messages: HashMap<String, String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            strict: true,
            concurrent: false,
            log_level: None,
            messages: HashMap::new(),
        }
    }
}

impl CliConfig {
    /// Loads `path`, or `cellcheck.toml` from the working directory if present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(Path::new(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        match &self.log_level {
            Some(level) => level
                .parse()
                .map_err(|_| anyhow!("Invalid log_level '{}' in configuration", level)),
            None => Ok(tracing::Level::INFO),
        }
    }

    /// Builds inspection options; `strict` overrides the configured value.
    pub fn inspect_options(&self, columns: Vec<String>, strict: Option<bool>) -> InspectOptions {
        let mut options = InspectOptions::new()
            .with_columns(columns)
            .with_strict(strict.unwrap_or(self.strict));
        for (code, template) in &self.messages {
            options = options.with_message(code.as_str(), template.as_str());
        }
        options
    }
}
