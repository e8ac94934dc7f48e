use crate::error::{AutowireError, Result};
use serde::Deserialize;
use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

const DEFAULT_MAX_DEPTH: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(depth) => depth,
    None => NonZeroUsize::MIN,
};

/// Container-wide settings
///
/// Loaded from JSON or from `AUTOWIRE_*` environment variables. Unknown
/// variables are ignored, malformed values are reported as
/// [`AutowireError::Config`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Build unbound identifiers from their registered descriptor.
    /// When disabled every identifier needs a binding or an instance.
    pub auto_resolve: bool,
    /// Deepest resolution chain allowed before giving up.
    pub max_depth: NonZeroUsize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            auto_resolve: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerConfig {
    pub const ENV_PREFIX: &'static str = "AUTOWIRE_";

    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(Self::ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref().trim();
            match name {
                "AUTO_RESOLVE" => config.auto_resolve = parse_bool(name, value)?,
                "MAX_DEPTH" => config.max_depth = parse_value(name, value)?,
                _ => {}
            }
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AutowireError::Config(e.to_string()))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AutowireError::Config(format!(
            "{}{} expects a boolean, got '{}'",
            ContainerConfig::ENV_PREFIX,
            name,
            value
        ))),
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        AutowireError::Config(format!(
            "{}{}: {}",
            ContainerConfig::ENV_PREFIX,
            name,
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContainerConfig::default();
        assert!(config.auto_resolve);
        assert_eq!(config.max_depth.get(), 256);
    }

    #[test]
    fn test_from_vars_reads_prefixed_keys() {
        let config = ContainerConfig::from_vars([
            ("AUTOWIRE_AUTO_RESOLVE", "off"),
            ("AUTOWIRE_MAX_DEPTH", "32"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();
        assert!(!config.auto_resolve);
        assert_eq!(config.max_depth.get(), 32);
    }

    #[test]
    fn test_from_vars_rejects_garbage() {
        let err = ContainerConfig::from_vars([("AUTOWIRE_MAX_DEPTH", "deep")]).unwrap_err();
        assert!(matches!(err, AutowireError::Config(_)));

        let err = ContainerConfig::from_vars([("AUTOWIRE_AUTO_RESOLVE", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("AUTOWIRE_AUTO_RESOLVE"));

        let err = ContainerConfig::from_vars([("AUTOWIRE_MAX_DEPTH", "0")]).unwrap_err();
        assert!(err.to_string().contains("AUTOWIRE_MAX_DEPTH"));
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = ContainerConfig::from_json(r#"{ "max_depth": 8 }"#).unwrap();
        assert!(config.auto_resolve);
        assert_eq!(config.max_depth.get(), 8);

        assert!(ContainerConfig::from_json(r#"{ "max_depth": 0 }"#).is_err());
    }
}
