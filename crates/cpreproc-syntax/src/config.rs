//! Parser settings.
//!
//! Settings load from TOML:
//!
//! ```toml
//! [parser]
//! lookahead_depth = 3
//! max_missing_tokens = 2
//! reuse_subtrees = true
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Upper bound for [`ParserConfig::lookahead_depth`].
pub const MAX_LOOKAHEAD_DEPTH: usize = 16;

/// Upper bound for [`ParserConfig::max_missing_tokens`].
pub const MAX_MISSING_TOKENS: usize = 4;

/// Tunables for a [`Parser`](crate::Parser).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Tokens simulated past a conflict before choosing an action.
    pub lookahead_depth: usize,
    /// Longest run of missing tokens error recovery may insert.
    pub max_missing_tokens: usize,
    /// Reuse subtrees of the old tree in [`Parser::reparse`](crate::Parser::reparse).
    pub reuse_subtrees: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookahead_depth: 3,
            max_missing_tokens: 2,
            reuse_subtrees: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserConfig,
}

impl ParserConfig {
    /// Parses a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        file.parser.validate()?;
        Ok(file.parser)
    }

    /// Checks that every setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead_depth == 0 || self.lookahead_depth > MAX_LOOKAHEAD_DEPTH {
            return Err(ConfigError::InvalidValue {
                key: "lookahead_depth",
                message: format!("must be between 1 and {MAX_LOOKAHEAD_DEPTH}"),
            });
        }
        if self.max_missing_tokens > MAX_MISSING_TOKENS {
            return Err(ConfigError::InvalidValue {
                key: "max_missing_tokens",
                message: format!("must be at most {MAX_MISSING_TOKENS}"),
            });
        }
        Ok(())
    }
}
