//! Guard configuration.
//!
//! Every field has a default matching the project layout, so an absent or
//! partial `preforge.toml` is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKFLOW_PATH: &str = ".gitea/workflows/ci.yml";
pub const DEFAULT_TOOLCHAIN_PROGRAM: &str = "forge";
pub const DEFAULT_VERSION_ARG: &str = "--version";
pub const DEFAULT_INSTALL_COMMAND: &str = "foundryup -v";
pub const DEFAULT_CI_ENV_VAR: &str = "CI";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {}", path.display(), source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// CI workflow holding the `nightly-<commit>` pin, relative to the working directory.
    pub workflow_path: PathBuf,
    pub toolchain_program: String,
    pub version_arg: String,
    /// Prefix of the remediation command; the nightly tag is appended.
    pub install_command: String,
    /// Environment variable that marks a CI run. The CLI skips the guard when it is set.
    pub ci_env_var: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            workflow_path: PathBuf::from(DEFAULT_WORKFLOW_PATH),
            toolchain_program: DEFAULT_TOOLCHAIN_PROGRAM.to_string(),
            version_arg: DEFAULT_VERSION_ARG.to_string(),
            install_command: DEFAULT_INSTALL_COMMAND.to_string(),
            ci_env_var: DEFAULT_CI_ENV_VAR.to_string(),
        }
    }
}

impl GuardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// True when `env_value` (the value of `ci_env_var`) marks a CI run.
    pub fn is_ci_value(env_value: Option<&str>) -> bool {
        env_value.is_some_and(|value| !value.is_empty())
    }
}
