//! Module: config
//! Responsibility: executor tuning knobs and collection layout, read from TOML.
//! Does not own: store configuration; stores arrive already opened.
//! Boundary: every field has a default, so an empty document is valid.

use crate::MAX_SEARCH_RESULTS;
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse query config: {detail}")]
    Parse { detail: String },

    #[error("invalid query config field '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            detail: err.to_string(),
        }
    }
}

///
/// QueryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Escalate ghost keys to hard errors instead of skipping them.
    pub verify_index: bool,

    /// Cap on ids one search collects before intersecting groups.
    pub max_search_results: u32,

    /// Upper bound applied to every query limit.
    pub max_query_limit: Option<u32>,

    pub layout: LayoutConfig,

    /// Locale handed to collators and tokenizers.
    pub locale: String,
}

impl QueryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_search_results == 0 {
            return Err(ConfigError::Invalid {
                field: "max_search_results",
                reason: "must be positive",
            });
        }
        if self.max_query_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_query_limit",
                reason: "must be positive",
            });
        }
        if self.layout.primary.is_empty() || self.layout.index.is_empty() {
            return Err(ConfigError::Invalid {
                field: "layout",
                reason: "collection names must not be empty",
            });
        }
        if self.layout.primary == self.layout.index {
            return Err(ConfigError::Invalid {
                field: "layout",
                reason: "primary and index collections must differ",
            });
        }

        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            verify_index: false,
            max_search_results: MAX_SEARCH_RESULTS,
            max_query_limit: None,
            layout: LayoutConfig::default(),
            locale: "en_US".to_string(),
        }
    }
}

///
/// LayoutConfig
///
/// Collection names used by `exec::find`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub primary: String,
    pub index: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            primary: "objects".to_string(),
            index: "indexes".to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = QueryConfig::from_toml_str("").expect("empty config");

        assert_eq!(config, QueryConfig::default());
        assert_eq!(config.max_search_results, MAX_SEARCH_RESULTS);
        assert_eq!(config.layout.primary, "objects");
    }

    #[test]
    fn fields_and_layout_table_parse() {
        let config = QueryConfig::from_toml_str(
            r#"
            verify_index = true
            max_query_limit = 50
            locale = "de_DE"

            [layout]
            index = "idx"
            "#,
        )
        .expect("config");

        assert!(config.verify_index);
        assert_eq!(config.max_query_limit, Some(50));
        assert_eq!(config.locale, "de_DE");
        assert_eq!(config.layout.primary, "objects");
        assert_eq!(config.layout.index, "idx");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = QueryConfig::from_toml_str("verify = true").expect_err("unknown field");

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_caps_are_rejected() {
        let err = QueryConfig::from_toml_str("max_search_results = 0").expect_err("zero cap");

        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_search_results",
                ..
            }
        ));
    }

    #[test]
    fn colliding_collections_are_rejected() {
        let err = QueryConfig::from_toml_str(
            r#"
            [layout]
            primary = "same"
            index = "same"
            "#,
        )
        .expect_err("shared collection");

        assert!(matches!(err, ConfigError::Invalid { field: "layout", .. }));
    }
}
