//! Generator configuration.
//!
//! The generator version is injected rather than read from a global, so the
//! engines can be exercised with any version string. Resolution order:
//! built-in default (`CARGO_PKG_VERSION`), then `RECORD_GENERATOR_VERSION`,
//! then an explicit override (the CLI's `--generator-version`).
//!
//! # Example
//!
//! ```
//! use record_generator::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::default().with_version("2.0.0");
//! assert_eq!(config.version, "2.0.0");
//! ```

use std::str::FromStr;

/// Environment variable overriding the generator version.
pub const VERSION_ENV: &str = "RECORD_GENERATOR_VERSION";

/// Environment variable making JSON the default CLI output.
pub const JSON_ENV: &str = "RECORD_GENERATOR_JSON";

/// Default generator version: the crate version.
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration shared by analysis, synthesis and fixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Version written into (and expected from) generated stamps.
    pub version: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(version) = env_var::<String>(VERSION_ENV).filter(|v| !v.trim().is_empty()) {
            config.version = version.trim().to_string();
        }
        config
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Check if an environment variable is set to a truthy value.
///
/// Returns `true` if the variable is set to "1", "true", "yes", or "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_crate_version() {
        let config = GeneratorConfig::default();
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_with_version_overrides() {
        let config = GeneratorConfig::default().with_version("0.0.123.456");
        assert_eq!(config.version, "0.0.123.456");
    }

    #[test]
    fn test_env_helpers_on_missing_vars() {
        assert_eq!(env_var::<u64>("RECORD_GENERATOR_TEST_UNSET_VAR"), None);
        assert!(!env_bool("RECORD_GENERATOR_TEST_UNSET_VAR"));
    }
}
