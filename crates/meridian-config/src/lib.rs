//! Configuration for Meridian (`meridian.toml`) and tracing setup.
//!
//! Every section is optional; a missing file behaves like an empty one.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [generation]
//! target_framework_version = "v4.7.1"
//! lang_version = "latest"
//! no_warn = ["0169", "0649"]
//!
//! [editor]
//! name = "Antigravity"
//! known_paths = ["/Applications/Antigravity.app"]
//! goto_flag = "--goto"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod diagnostics;
mod logging;
mod validation;

pub use diagnostics::{
    ConfigDiagnostics, ConfigValidationError, ConfigWarning, ValidationDiagnostics,
};
pub use logging::init_tracing;

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeridianConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Fixed properties written into every project descriptor.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// External editor installation and command-line conventions.
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Either a simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file path. If the file cannot be opened, file logging is
    /// disabled while stderr logging remains active.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Effective filter: the configured level, with `RUST_LOG` merged on top when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "GenerationConfig::default_target_framework_version")]
    pub target_framework_version: String,

    #[serde(default = "GenerationConfig::default_lang_version")]
    pub lang_version: String,

    /// Compiler warning numbers suppressed in every project (joined with `;`).
    #[serde(default = "GenerationConfig::default_no_warn")]
    pub no_warn: Vec<String>,
}

impl GenerationConfig {
    fn default_target_framework_version() -> String {
        "v4.7.1".to_owned()
    }

    fn default_lang_version() -> String {
        "latest".to_owned()
    }

    fn default_no_warn() -> Vec<String> {
        // CS0169: field never used. CS0649: field never assigned.
        vec!["0169".to_owned(), "0649".to_owned()]
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_framework_version: Self::default_target_framework_version(),
            lang_version: Self::default_lang_version(),
            no_warn: Self::default_no_warn(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Product name. Also used to recognise user-chosen installation paths.
    #[serde(default = "EditorConfig::default_name")]
    pub name: String,

    /// Installation paths (bundles or executables) probed when listing installations.
    #[serde(default = "EditorConfig::default_known_paths")]
    pub known_paths: Vec<PathBuf>,

    /// Executable paths relative to a bundle directory, tried in order.
    #[serde(default = "EditorConfig::default_executable_candidates")]
    pub executable_candidates: Vec<PathBuf>,

    /// Directory inside a bundle whose first file is used when no candidate exists.
    #[serde(default = "EditorConfig::default_binary_dir")]
    pub binary_dir: PathBuf,

    /// Helper used to launch application bundles on macOS.
    #[serde(default = "EditorConfig::default_bundle_helper")]
    pub bundle_helper: PathBuf,

    /// Flag preceding the `path:line:column` argument. An empty string passes the
    /// position argument without a flag.
    #[serde(default = "EditorConfig::default_goto_flag")]
    pub goto_flag: String,
}

impl EditorConfig {
    fn default_name() -> String {
        "Antigravity".to_owned()
    }

    fn default_known_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/Applications/Antigravity.app"),
            PathBuf::from("/Applications/Antigravity.app/Contents/MacOS/Antigravity"),
        ]
    }

    fn default_executable_candidates() -> Vec<PathBuf> {
        vec![
            PathBuf::from("Contents/MacOS/Antigravity"),
            PathBuf::from("Contents/MacOS/Electron"),
        ]
    }

    fn default_binary_dir() -> PathBuf {
        PathBuf::from("Contents/MacOS")
    }

    fn default_bundle_helper() -> PathBuf {
        PathBuf::from("/usr/bin/open")
    }

    fn default_goto_flag() -> String {
        "--goto".to_owned()
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            known_paths: Self::default_known_paths(),
            executable_candidates: Self::default_executable_candidates(),
            binary_dir: Self::default_binary_dir(),
            bundle_helper: Self::default_bundle_helper(),
            goto_flag: Self::default_goto_flag(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl MeridianConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_config(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load a config from TOML text and report unknown keys and validation failures.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<MeridianConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.extend_validation(config.validate());

        Ok((config, diagnostics))
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub const MERIDIAN_CONFIG_ENV_VAR: &str = "MERIDIAN_CONFIG_PATH";

/// Discover the configuration file for a project root.
///
/// Search order:
/// 1) `MERIDIAN_CONFIG_PATH` (absolute or relative to `project_root`)
/// 2) `meridian.toml`
/// 3) `.meridian.toml`
/// 4) `.meridian/config.toml`
pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(MERIDIAN_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            project_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["meridian.toml", ".meridian.toml", ".meridian/config.toml"]
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a project root.
///
/// If no config is present, returns [`MeridianConfig::default`], `None` and empty
/// diagnostics.
pub fn load_for_project(
    project_root: &Path,
) -> Result<(MeridianConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(project_root) else {
        return Ok((MeridianConfig::default(), None, ConfigDiagnostics::default()));
    };

    let text = read_config(&path)?;
    let (config, diagnostics) = MeridianConfig::load_from_str_with_diagnostics(&text)?;
    Ok((config, Some(path), diagnostics))
}
