use std::fmt;
use std::path::{Path, PathBuf};

use meridian_process::SpawnedProcess;
use meridian_project::{AssetChanges, GenerationReport, ModuleProvider, ProjectGenerator, SyncError};

use crate::{EditorSettings, LaunchError, LaunchRequest, Launcher};

/// An editor installation found on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub name: String,
    pub path: PathBuf,
}

/// The surface a host uses to drive an external code editor.
pub trait CodeEditor: fmt::Debug {
    fn name(&self) -> &str;

    fn installations(&self) -> Vec<Installation>;

    fn try_installation_for(&self, path: &Path) -> Option<Installation>;

    /// Called once when the host starts using this editor.
    fn initialize(&self) -> Result<GenerationReport, SyncError> {
        self.sync_all()
    }

    fn sync_all(&self) -> Result<GenerationReport, SyncError>;

    fn sync_if_needed(&self, changes: &AssetChanges)
        -> Result<Option<GenerationReport>, SyncError>;

    fn open(
        &self,
        installation: &Path,
        request: &LaunchRequest,
    ) -> Result<SpawnedProcess, LaunchError>;
}

/// Editors are registered explicitly by the host at startup.
pub trait EditorRegistry {
    fn register(&mut self, editor: Box<dyn CodeEditor>);
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    editors: Vec<Box<dyn CodeEditor>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editors(&self) -> impl Iterator<Item = &dyn CodeEditor> {
        self.editors.iter().map(|editor| editor.as_ref())
    }

    /// The first registered editor that recognises `path` as one of its installations.
    pub fn find_for_path(&self, path: &Path) -> Option<(&dyn CodeEditor, Installation)> {
        self.editors().find_map(|editor| {
            editor
                .try_installation_for(path)
                .map(|installation| (editor, installation))
        })
    }
}

impl EditorRegistry for InMemoryRegistry {
    fn register(&mut self, editor: Box<dyn CodeEditor>) {
        tracing::debug!(target: "meridian.launch", editor = editor.name(), "registered editor");
        self.editors.push(editor);
    }
}

/// The configured external editor bound to one project.
#[derive(Debug)]
pub struct ExternalEditor {
    launcher: Launcher,
    generator: ProjectGenerator,
    provider: Box<dyn ModuleProvider>,
}

impl ExternalEditor {
    pub fn new(
        launcher: Launcher,
        generator: ProjectGenerator,
        provider: Box<dyn ModuleProvider>,
    ) -> Self {
        Self {
            launcher,
            generator,
            provider,
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        self.launcher.settings()
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn generator(&self) -> &ProjectGenerator {
        &self.generator
    }

    /// Whether `candidate` looks like an installation of this editor.
    ///
    /// The check is a case-sensitive substring match on the product name.
    pub fn matches(&self, candidate: &Path) -> bool {
        let name = &self.settings().name;
        !name.is_empty() && candidate.to_string_lossy().contains(name.as_str())
    }
}

impl CodeEditor for ExternalEditor {
    fn name(&self) -> &str {
        &self.settings().name
    }

    fn installations(&self) -> Vec<Installation> {
        self.settings()
            .known_paths
            .iter()
            .filter(|path| path.exists())
            .map(|path| Installation {
                name: self.settings().name.clone(),
                path: path.clone(),
            })
            .collect()
    }

    fn try_installation_for(&self, path: &Path) -> Option<Installation> {
        self.matches(path).then(|| Installation {
            name: self.settings().name.clone(),
            path: path.to_path_buf(),
        })
    }

    fn sync_all(&self) -> Result<GenerationReport, SyncError> {
        self.generator.sync(self.provider.as_ref())
    }

    fn sync_if_needed(
        &self,
        changes: &AssetChanges,
    ) -> Result<Option<GenerationReport>, SyncError> {
        self.generator.sync_if_needed(self.provider.as_ref(), changes)
    }

    fn open(
        &self,
        installation: &Path,
        request: &LaunchRequest,
    ) -> Result<SpawnedProcess, LaunchError> {
        self.launcher
            .launch(installation, request, &self.generator, Some(self.provider.as_ref()))
    }
}
