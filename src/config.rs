//! Service configuration read from the environment

use std::str::FromStr;
use thiserror::Error;

use crate::rules::DEFAULT_REFERENCE_ATTRIBUTE;

pub const DEFAULT_PORT: u16 = 8084;
pub const DEFAULT_MAX_RULES: usize = 200;
pub const DEFAULT_MAX_RECORDS: usize = 5000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    /// Upper bound on rules per request.
    pub max_rules: usize,
    /// Upper bound on hierarchy records or preview documents per request.
    pub max_records: usize,
    pub reference_attributes: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_rules: DEFAULT_MAX_RULES,
            max_records: DEFAULT_MAX_RECORDS,
            reference_attributes: vec![DEFAULT_REFERENCE_ATTRIBUTE.to_string()],
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let reference_attributes = match lookup("MERCH_REFERENCE_ATTRIBUTES") {
            Some(raw) => raw.split(',').map(str::trim).filter(|a| !a.is_empty()).map(str::to_string).collect(),
            None => defaults.reference_attributes,
        };
        Ok(Self {
            port: parse(&lookup, "PORT", defaults.port)?,
            max_rules: parse(&lookup, "MERCH_MAX_RULES", defaults.max_rules)?,
            max_records: parse(&lookup, "MERCH_MAX_RECORDS", defaults.max_records)?,
            reference_attributes,
        })
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}
