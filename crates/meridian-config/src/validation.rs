use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{LoggingConfig, MeridianConfig};

impl MeridianConfig {
    /// Validate semantic invariants. Reports as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_logging(self, &mut out);
        validate_generation(self, &mut out);
        validate_editor(self, &mut out);

        out
    }
}

fn validate_logging(config: &MeridianConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}

fn validate_generation(config: &MeridianConfig, out: &mut ValidationDiagnostics) {
    let generation = &config.generation;

    if generation.target_framework_version.trim().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "generation.target_framework_version".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    for (idx, code) in generation.no_warn.iter().enumerate() {
        if code.contains(';') {
            out.warnings.push(ConfigWarning::InvalidValue {
                toml_path: format!("generation.no_warn[{idx}]"),
                message: "list one warning code per entry instead of joining with `;`"
                    .to_owned(),
            });
        }
    }
}

fn validate_editor(config: &MeridianConfig, out: &mut ValidationDiagnostics) {
    let editor = &config.editor;

    if editor.name.trim().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "editor.name".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    if editor.bundle_helper.as_os_str().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "editor.bundle_helper".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }

    for (idx, candidate) in editor.executable_candidates.iter().enumerate() {
        if candidate.is_absolute() {
            out.warnings.push(ConfigWarning::InvalidValue {
                toml_path: format!("editor.executable_candidates[{idx}]"),
                message: format!(
                    "{} is absolute; candidates are resolved relative to the installation bundle",
                    candidate.display()
                ),
            });
        }
    }

    if editor.binary_dir.is_absolute() {
        out.warnings.push(ConfigWarning::InvalidValue {
            toml_path: "editor.binary_dir".to_owned(),
            message: "should be relative to the installation bundle".to_owned(),
        });
    }

    if !editor.goto_flag.is_empty() && !editor.goto_flag.starts_with('-') {
        out.warnings.push(ConfigWarning::InvalidValue {
            toml_path: "editor.goto_flag".to_owned(),
            message: format!(
                "`{}` does not look like a command-line flag",
                editor.goto_flag
            ),
        });
    }
}
