//! Engine configuration consumed by the value layer.
//!
//! The value types never look configuration up on their own, callers pass a
//! [`Config`] (or the piece of it an operation needs) explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// On-disk format generation of the database the values belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    /// Databases created before the compact length headers existed.
    /// Binary lengths are written as a 4-byte bit count and floating point
    /// values are held to the DB2 limits.
    Legacy,
    #[default]
    Current,
}

/// Which set of bounds REAL and DOUBLE values are validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatLimits {
    Db2,
    Ieee,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecimalConfig {
    /// Largest precision a DECIMAL column may be declared with.
    pub max_precision: u32,
    /// Lower bound for the default scale of a division result.
    pub min_divide_scale: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Date patterns tried, in order, when none of the fixed grammars match.
    pub date_patterns: Vec<String>,
    /// Time patterns tried, in order, when none of the fixed grammars match.
    pub time_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub format_version: FormatVersion,
    /// Overrides the float limit profile implied by `format_version`.
    pub float_limits: Option<FloatLimits>,
    pub decimal: DecimalConfig,
    pub locale: LocaleConfig,
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            max_precision: 31,
            min_divide_scale: 4,
        }
    }
}

impl FormatVersion {
    pub const fn float_limits(self) -> FloatLimits {
        match self {
            Self::Legacy => FloatLimits::Db2,
            Self::Current => FloatLimits::Ieee,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        tracing::debug!(
            format_version = ?config.format_version,
            float_limits = ?config.float_limits(),
            "loaded value configuration"
        );
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The effective float limit profile.
    pub fn float_limits(&self) -> FloatLimits {
        self.float_limits
            .unwrap_or_else(|| self.format_version.float_limits())
    }
}
