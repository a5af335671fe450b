//! Engine configuration

use serde::{Deserialize, Serialize};

/// Prefix for generated identifiers and literal entity ids
pub const DEFAULT_ID_PREFIX: &str = "AUTO";

/// Tunables for prompting, parsing and grounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix for URI-typed identifiers and normalized entity ids
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Maximum nesting of inlined objects
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum edit distance for enum matching (0 = exact, case-insensitive)
    #[serde(default)]
    pub enum_fuzzy_distance: usize,

    /// Start prompts with the instruction header
    #[serde(default = "default_include_header")]
    pub include_header: bool,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

fn default_max_depth() -> usize {
    10
}

fn default_include_header() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            max_depth: default_max_depth(),
            enum_fuzzy_distance: 0,
            include_header: default_include_header(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier prefix
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Allow enum values within this edit distance to match
    pub fn with_enum_fuzzy_distance(mut self, distance: usize) -> Self {
        self.enum_fuzzy_distance = distance;
        self
    }

    /// Toggle the prompt header
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.id_prefix, "AUTO");
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.enum_fuzzy_distance, 0);
        assert!(config.include_header);
    }

    #[test]
    fn test_partial_yaml() {
        let config: EngineConfig = serde_yaml::from_str("max_depth: 3\nid_prefix: GEN").unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.id_prefix, "GEN");
        assert!(config.include_header);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_id_prefix("X")
            .with_max_depth(2)
            .with_enum_fuzzy_distance(1)
            .with_header(false);
        assert_eq!(config.id_prefix, "X");
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.enum_fuzzy_distance, 1);
        assert!(!config.include_header);
    }
}
