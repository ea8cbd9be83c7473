//! Runtime limits read from the environment.
use std::{str::FromStr, sync::LazyLock};

use thiserror::Error;

use crate::search::SearchAlgorithm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotConfig {
    /// `ROBOT_MAX_OPS`, the maximum number of executed instructions.
    pub max_op_count: u64,
    /// `ROBOT_MAX_STACK`, the maximum number of stack elements.
    pub max_stack_size: usize,
    /// `ROBOT_SEARCH`, the engine used by `REPLACEONE`.
    pub search: SearchAlgorithm,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self { max_op_count: u64::MAX, max_stack_size: usize::MAX, search: SearchAlgorithm::default() }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to parse env var {key} with value `{value}`: {message}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub message: String,
}

fn parse_value<T>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    match value {
        None => Ok(None),
        Some(val) if val.trim().is_empty() => Ok(None),
        Some(val) => match val.trim().parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(err) => Err(ConfigError { key: key.to_string(), value: val, message: err.to_string() }),
        },
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    Ok(parse_value(key, std::env::var(key).ok())?.unwrap_or(default))
}

/// Reads the configuration from the environment; unset or empty variables keep their defaults.
pub fn create_config() -> Result<RobotConfig, ConfigError> {
    let defaults = RobotConfig::default();
    Ok(RobotConfig {
        max_op_count: parse_env("ROBOT_MAX_OPS", defaults.max_op_count)?,
        max_stack_size: parse_env("ROBOT_MAX_STACK", defaults.max_stack_size)?,
        search: parse_env("ROBOT_SEARCH", defaults.search)?,
    })
}

static CELL: LazyLock<Result<RobotConfig, ConfigError>> = LazyLock::new(|| create_config());

/// The process-wide configuration, read once.
pub fn get_config() -> Result<&'static RobotConfig, ConfigError> {
    CELL.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("K", None), Ok(None));
        assert_eq!(parse_value::<u64>("K", Some("  ".to_string())), Ok(None));
        assert_eq!(parse_value::<u64>("K", Some("1000".to_string())), Ok(Some(1000)));
        assert_eq!(parse_value::<SearchAlgorithm>("K", Some("rk".to_string())), Ok(Some(SearchAlgorithm::RabinKarp)));

        let err = parse_value::<usize>("ROBOT_MAX_STACK", Some("lots".to_string())).unwrap_err();
        assert_eq!(err.key, "ROBOT_MAX_STACK");
        assert_eq!(err.value, "lots");
    }

    #[test]
    fn test_defaults_are_unlimited() {
        let config = RobotConfig::default();
        assert_eq!(config.max_op_count, u64::MAX);
        assert_eq!(config.max_stack_size, usize::MAX);
        assert_eq!(config.search, SearchAlgorithm::BoyerMoore);
    }
}
