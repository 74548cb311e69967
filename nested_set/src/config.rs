//! Tree configuration.
//!
//! Configuration can be built in code or loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `NESTED_SET_MIN_LEFT`: Left bound of the first root in an empty scope (default: `0`)
//! - `NESTED_SET_MAX_DEPTH`: Deepest level the tree builder will assemble (default: `1024`)
//! - `NESTED_SET_MAX_NODES`: Most nodes a single builder call will assemble (default: `1000000`)
//!
//! # Invariants
//!
//! - `max_depth` and `max_nodes` are at least 1

/// Configuration shared by every operation on a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Left bound given to the first root of an empty scope.
    pub min_left: i64,
    /// Deepest level the builder will descend to; roots are depth 0.
    pub max_depth: usize,
    /// Most nodes one builder call will assemble.
    pub max_nodes: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_left: Self::DEFAULT_MIN_LEFT,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}

impl TreeConfig {
    /// Default floor bound.
    pub const DEFAULT_MIN_LEFT: i64 = 0;
    /// Default depth limit.
    pub const DEFAULT_MAX_DEPTH: usize = 1024;
    /// Default size limit.
    pub const DEFAULT_MAX_NODES: usize = 1_000_000;

    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but does not parse, or a limit is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let min_left = parse_var(&lookup, "NESTED_SET_MIN_LEFT", Self::DEFAULT_MIN_LEFT)?;
        let max_depth = parse_limit(&lookup, "NESTED_SET_MAX_DEPTH", Self::DEFAULT_MAX_DEPTH)?;
        let max_nodes = parse_limit(&lookup, "NESTED_SET_MAX_NODES", Self::DEFAULT_MAX_NODES)?;

        Ok(Self {
            min_left,
            max_depth,
            max_nodes,
        })
    }

    /// Set the floor bound.
    #[must_use]
    pub const fn with_min_left(mut self, min_left: i64) -> Self {
        self.min_left = min_left;
        self
    }

    /// Set the depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the size limit.
    #[must_use]
    pub const fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a valid integer"),
        }),
        None => Ok(default),
    }
}

fn parse_limit(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    let value = parse_var(lookup, name, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn test_default_values() {
        let config = TreeConfig::default();
        assert_eq!(config.min_left, 0);
        assert_eq!(config.max_depth, 1024);
        assert_eq!(config.max_nodes, 1_000_000);
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        let config = TreeConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, TreeConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = TreeConfig::from_lookup(lookup(&[
            ("NESTED_SET_MIN_LEFT", "1"),
            ("NESTED_SET_MAX_DEPTH", " 16 "),
            ("NESTED_SET_MAX_NODES", "500"),
        ]))
        .expect("config");
        assert_eq!(
            config,
            TreeConfig::default()
                .with_min_left(1)
                .with_max_depth(16)
                .with_max_nodes(500)
        );
    }

    #[test]
    fn test_invalid_values() {
        let error = TreeConfig::from_lookup(lookup(&[("NESTED_SET_MIN_LEFT", "zero")]))
            .expect_err("should fail");
        assert_eq!(
            error.to_string(),
            "invalid value for NESTED_SET_MIN_LEFT: 'zero' is not a valid integer"
        );

        let error = TreeConfig::from_lookup(lookup(&[("NESTED_SET_MAX_DEPTH", "0")]))
            .expect_err("should fail");
        assert_eq!(
            error,
            ConfigError::InvalidValue {
                name: "NESTED_SET_MAX_DEPTH".to_string(),
                message: "must be at least 1".to_string(),
            }
        );
    }
}
