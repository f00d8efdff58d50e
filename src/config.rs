//! Driver configuration.
//!
//! Loaded from a TOML file, then overridden by environment variables:
//!
//! ```toml
//! artifact = "build/instructions.mnky"
//! vm = "/usr/local/bin/monkey-vm"
//!
//! [analysis]
//! unused_as_error = false
//! ```
//!
//! | Variable          | Overrides  |
//! |-------------------|------------|
//! | `MONKEY_ARTIFACT` | `artifact` |
//! | `MONKEY_VM`       | `vm`       |

use std::path::{Path, PathBuf};

use monkey_compiler::AnalysisOptions;
use serde::Deserialize;

use crate::error::{DriverError, DriverResult};

/// Environment variable overriding the artifact path.
pub const ARTIFACT_ENV: &str = "MONKEY_ARTIFACT";
/// Environment variable overriding the VM executable.
pub const VM_ENV: &str = "MONKEY_VM";

/// Where compiled programs go and how they are run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonkeyConfig {
    /// The single well-known file the compiled program is saved to.
    pub artifact: PathBuf,
    /// VM executable, invoked with the artifact path as its only argument.
    pub vm: PathBuf,
    /// Contextual analysis options.
    pub analysis: AnalysisOptions,
}

impl Default for MonkeyConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("instructions.mnky"),
            vm: PathBuf::from("monkey-vm"),
            analysis: AnalysisOptions::default(),
        }
    }
}

impl MonkeyConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> DriverResult<Self> {
        toml::from_str(text).map_err(|e| DriverError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a configuration file, or the defaults when `path` is `None`,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> DriverResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|e| DriverError::io(path, e))?;
                Self::from_toml(&text, path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var_os(name).map(PathBuf::from));
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`load`](Self::load)).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<PathBuf>) {
        if let Some(artifact) = lookup(ARTIFACT_ENV) {
            self.artifact = artifact;
        }
        if let Some(vm) = lookup(VM_ENV) {
            self.vm = vm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = MonkeyConfig::from_toml("", Path::new("monkey.toml")).unwrap();
        assert_eq!(config, MonkeyConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let text = r#"
artifact = "out/prog.mnky"
vm = "/opt/vm"

[analysis]
unused_as_error = true
"#;
        let config = MonkeyConfig::from_toml(text, Path::new("monkey.toml")).unwrap();
        assert_eq!(config.artifact, PathBuf::from("out/prog.mnky"));
        assert_eq!(config.vm, PathBuf::from("/opt/vm"));
        assert!(config.analysis.unused_as_error);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MonkeyConfig::from_toml("artefact = \"x\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, DriverError::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = MonkeyConfig::default();
        config.apply_overrides(|name| match name {
            ARTIFACT_ENV => Some(PathBuf::from("/tmp/a.mnky")),
            _ => None,
        });
        assert_eq!(config.artifact, PathBuf::from("/tmp/a.mnky"));
        assert_eq!(config.vm, PathBuf::from("monkey-vm"));
    }
}
