//! Aligner configuration: tokenizer mode, edit costs, edit bound, progress
//! interval. Method shapes (`load_toml`/`save_toml`/`from_toml_str`/
//! `to_toml_string`) follow the same TOML-config convention used elsewhere
//! in this workspace.

use crate::tokenize::TokenizerMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCosts {
    pub insert: f64,
    pub delete: f64,
    pub substitute: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            insert: 1.0,
            delete: 1.0,
            substitute: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    pub tokenizer: TokenizerMode,
    pub costs: EditCosts,
    /// Maximum number of non-match edits per alignment. `0` means no bound.
    pub bound: u32,
    /// Progress is logged to stderr every `logk` utterances.
    pub logk: u32,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerMode::Whitespace,
            costs: EditCosts::default(),
            bound: 0,
            logk: 500,
        }
    }
}

impl AlignerConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unit_costs_unbounded_whitespace() {
        let cfg = AlignerConfig::default();
        assert_eq!(cfg.costs.insert, 1.0);
        assert_eq!(cfg.costs.delete, 1.0);
        assert_eq!(cfg.costs.substitute, 1.0);
        assert_eq!(cfg.bound, 0);
        assert_eq!(cfg.logk, 500);
        assert_eq!(cfg.tokenizer, TokenizerMode::Whitespace);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = AlignerConfig::default();
        let s = cfg.to_toml_string().unwrap();
        let back = AlignerConfig::from_toml_str(&s).unwrap();
        assert_eq!(back.bound, cfg.bound);
        assert_eq!(back.costs, cfg.costs);
    }
}
