//! Engine configuration
use serde::{Deserialize, Serialize};

/// How the engine reacts to an entry whose floor tag is missing or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Stop reading the affected category (or the whole replay) at the first bad entry.
    #[default]
    Strict,
    /// Skip the bad entry, log it, and keep going.
    Lenient,
}

impl ValidationMode {
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenConfig {
    #[serde(default)]
    pub validation: ValidationMode,
    /// Path symbols that mark a boss floor.
    #[serde(default = "FlattenConfig::default_boss_path_symbols")]
    pub boss_path_symbols: Vec<String>,
    /// Card reward pick recorded when the player took nothing.
    #[serde(default = "FlattenConfig::default_skip_pick")]
    pub skip_pick: String,
    /// Campfire action that upgrades its target card.
    #[serde(default = "FlattenConfig::default_upgrade_action")]
    pub upgrade_action: String,
    #[serde(default = "FlattenConfig::default_upgrade_suffix")]
    pub upgrade_suffix: String,
}

impl FlattenConfig {
    fn default_boss_path_symbols() -> Vec<String> {
        vec!["B".to_string(), "BOSS".to_string()]
    }

    fn default_skip_pick() -> String {
        "SKIP".to_string()
    }

    fn default_upgrade_action() -> String {
        "SMITH".to_string()
    }

    fn default_upgrade_suffix() -> String {
        "+1".to_string()
    }

    /// Get default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON string; omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn is_boss_symbol(&self, symbol: Option<&str>) -> bool {
        symbol.is_some_and(|s| self.boss_path_symbols.iter().any(|boss| boss == s))
    }

    /// Name a card takes after one campfire upgrade.
    #[must_use]
    pub fn upgraded(&self, card: &str) -> String {
        format!("{card}{}", self.upgrade_suffix)
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::default(),
            boss_path_symbols: Self::default_boss_path_symbols(),
            skip_pick: Self::default_skip_pick(),
            upgrade_action: Self::default_upgrade_action(),
            upgrade_suffix: Self::default_upgrade_suffix(),
        }
    }
}
