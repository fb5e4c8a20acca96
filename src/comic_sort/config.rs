use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Environment variable and `.env` key for the external collection directory.
pub const EXTERNAL_DIR_VAR: &str = "COMIC_SORTER_EXTERNAL_DIR";

/// Dotenv file read from the working directory.
pub const ENV_FILE_NAME: &str = ".env";

/// Config from the user config file
#[derive(Debug, Deserialize)]
pub struct ComicSortUserConfig {
    #[serde(default = "default_true")]
    pub capitalize: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub external_dir: Option<String>,
    #[serde(default)]
    pub recurse: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    comicsort: ComicSortUserConfig,
}

impl ComicSortUserConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// A missing `[comicsort]` section gives the defaults.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.comicsort)
            .with_context(|| "Failed to parse config TOML")
    }
}

impl Default for ComicSortUserConfig {
    fn default() -> Self {
        Self {
            capitalize: true,
            debug: false,
            dryrun: false,
            external_dir: None,
            recurse: false,
            verbose: false,
        }
    }
}

/// Read a single key from a dotenv file without touching the process environment.
///
/// Returns `None` if the file is missing, unparseable, or does not contain the key.
#[must_use]
pub fn read_env_file_value(path: &Path, key: &str) -> Option<String> {
    dotenvy::from_path_iter(path)
        .ok()?
        .filter_map(Result::ok)
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

/// Return the first candidate that is set and not blank.
///
/// ```rust
/// use std::path::PathBuf;
/// use comic_sorter::comic_sort::first_configured_dir;
///
/// let dir = first_configured_dir([None, Some("  ".to_string()), Some("/comics".to_string())]);
/// assert_eq!(dir, Some(PathBuf::from("/comics")));
/// ```
#[must_use]
pub fn first_configured_dir(candidates: impl IntoIterator<Item = Option<String>>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolve the external collection directory.
///
/// Precedence: command line, `.env` file, user config file, process environment.
/// Empty values are treated as unset. The directory is not checked for existence here.
#[must_use]
pub fn resolve_external_dir(
    cli_value: Option<&Path>,
    env_file: &Path,
    user_config_value: Option<&str>,
) -> Option<PathBuf> {
    first_configured_dir([
        cli_value.map(crate::path_to_string),
        read_env_file_value(env_file, EXTERNAL_DIR_VAR),
        user_config_value.map(ToString::to_string),
        std::env::var(EXTERNAL_DIR_VAR).ok(),
    ])
}

const fn default_true() -> bool {
    true
}
