//! Launching the external editor against a generated workspace.
//!
//! [`Launcher`] turns a [`LaunchRequest`] into a literal command line for the host
//! platform and hands it to a [`ProcessSpawner`]. Before launching it makes sure the
//! solution descriptor exists so the editor always opens onto a usable workspace.

mod editor;
mod platform;
mod resolve;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use meridian_process::{CommandSpec, ProcessSpawner, SpawnError, SpawnedProcess};
use meridian_project::{ModuleProvider, ProjectGenerator};
use thiserror::Error;

pub use editor::{CodeEditor, EditorRegistry, ExternalEditor, InMemoryRegistry, Installation};
pub use meridian_config::EditorConfig as EditorSettings;
pub use platform::HostPlatform;
pub use resolve::{resolve_executable, ExecutableCandidates, Resolution, ResolutionWarning};

/// What to open: optionally a file, optionally a position in it.
///
/// A line or column of `0` means "not given", matching how hosts report a missing
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl LaunchRequest {
    /// Open the workspace without a target file.
    pub fn workspace() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    fn target(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    fn line(&self) -> Option<u32> {
        self.line.filter(|&line| line > 0)
    }

    fn column(&self) -> Option<u32> {
        self.column.filter(|&column| column > 0)
    }
}

#[derive(Debug, Error)]
#[error("failed to launch editor `{}`: {source}", .executable.display())]
pub struct LaunchError {
    pub executable: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    project_root: PathBuf,
    settings: EditorSettings,
    platform: HostPlatform,
    spawner: Arc<dyn ProcessSpawner>,
}

impl Launcher {
    pub fn new(
        project_root: impl Into<PathBuf>,
        settings: EditorSettings,
        platform: HostPlatform,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            settings,
            platform,
            spawner,
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Arguments understood by the editor itself: the workspace first, then the target.
    pub fn editor_arguments(&self, request: &LaunchRequest) -> Vec<String> {
        let mut args = vec![self.project_root.display().to_string()];

        let Some(target) = request.target() else {
            return args;
        };
        let path = if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.project_root.join(target)
        };

        if !path.exists() {
            tracing::warn!(
                target: "meridian.launch",
                path = %path.display(),
                "target file does not exist; opening the workspace only"
            );
            return args;
        }

        match request.line() {
            Some(line) => {
                let column = request.column().unwrap_or(1);
                if !self.settings.goto_flag.is_empty() {
                    args.push(self.settings.goto_flag.clone());
                }
                args.push(format!("{}:{line}:{column}", path.display()));
            }
            None => args.push(path.display().to_string()),
        }
        args
    }

    /// Build the full command line for `installation` without starting anything.
    pub fn command_for(&self, installation: &Path, request: &LaunchRequest) -> CommandSpec {
        let editor_args = self.editor_arguments(request);

        if self.platform.launches_bundles() && is_app_bundle(installation) {
            let mut args = vec![
                "-a".to_owned(),
                installation.display().to_string(),
                "-n".to_owned(),
                "--args".to_owned(),
            ];
            args.extend(editor_args);
            return CommandSpec::new(&self.project_root, &self.settings.bundle_helper, &args);
        }

        let resolution =
            resolve_executable(installation, &ExecutableCandidates::from_config(&self.settings));
        if let Some(warning) = resolution.warning() {
            tracing::warn!(
                target: "meridian.launch",
                installation = %warning.installation.display(),
                tried = ?warning.tried,
                "{warning}"
            );
        }
        CommandSpec::new(&self.project_root, resolution.path(), &editor_args)
    }

    /// Start the editor, generating the workspace first if its solution is missing.
    ///
    /// Generation needs a module provider; without one a missing solution is left
    /// missing rather than written empty. A failed generation is logged and does not
    /// prevent the launch.
    pub fn launch(
        &self,
        installation: &Path,
        request: &LaunchRequest,
        generator: &ProjectGenerator,
        provider: Option<&dyn ModuleProvider>,
    ) -> Result<SpawnedProcess, LaunchError> {
        if !generator.solution_exists() {
            let solution = generator.solution_path();
            match provider {
                Some(provider) => {
                    tracing::info!(
                        target: "meridian.launch",
                        solution = %solution.display(),
                        "solution descriptor missing; generating before launch"
                    );
                    if let Err(err) = generator.sync(provider) {
                        tracing::warn!(
                            target: "meridian.launch",
                            error = %err,
                            "workspace generation failed; launching anyway"
                        );
                    }
                }
                None => tracing::warn!(
                    target: "meridian.launch",
                    solution = %solution.display(),
                    "solution descriptor missing and no module provider; skipping generation"
                ),
            }
        }

        let command = self.command_for(installation, request);
        tracing::info!(target: "meridian.launch", command = %command, "launching editor");

        self.spawner.spawn(&command).map_err(|SpawnError { command, source }| {
            tracing::error!(
                target: "meridian.launch",
                executable = %command.program.display(),
                error = %source,
                "failed to start editor"
            );
            LaunchError {
                executable: command.program,
                source,
            }
        })
    }
}

fn is_app_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "app")
}
