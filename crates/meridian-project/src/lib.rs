//! Descriptor generation: one `.csproj` per module plus one aggregating `.sln`.
//!
//! Every pass regenerates every file. There is no incremental mode and no rollback: a
//! failed write for one module is reported but does not stop the remaining modules or
//! the solution from being written, and a later pass over the same module set rewrites
//! everything identically.

mod csproj;
mod provider;
mod sln;

pub use csproj::{render_project, PROJECT_EXTENSION};
pub use provider::{AssetChanges, ManifestProvider, ModuleProvider, ProviderError};
pub use sln::{render_solution, CSHARP_PROJECT_TYPE, SOLUTION_EXTENSION};

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use meridian_config::GenerationConfig;
use meridian_core::{dangling_references, duplicate_modules, write_file_atomic, Module, WriteError};
use thiserror::Error;

/// At least one descriptor could not be written. Files written before and after the
/// failures stay on disk.
#[derive(Debug, Error)]
pub struct GenerationError {
    pub failures: Vec<WriteError>,
}

impl GenerationError {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.failures.iter().map(|failure| failure.path.as_path())
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [] => write!(f, "descriptor generation failed"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(
                f,
                "{first} (and {} more descriptor files failed)",
                rest.len()
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Files written by a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub projects: Vec<PathBuf>,
    pub solution: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProjectGenerator {
    root: PathBuf,
    config: GenerationConfig,
}

impl ProjectGenerator {
    pub fn new(root: impl Into<PathBuf>, config: GenerationConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn project_path(&self, module_name: &str) -> PathBuf {
        self.root
            .join(format!("{module_name}.{PROJECT_EXTENSION}"))
    }

    /// `{root}/{basename(root)}.sln`.
    pub fn solution_path(&self) -> PathBuf {
        let stem = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .or_else(|| {
                // `.` and friends have no file name until canonicalized.
                let canonical = self.root.canonicalize().ok()?;
                Some(canonical.file_name()?.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Solution".to_owned());
        self.root.join(format!("{stem}.{SOLUTION_EXTENSION}"))
    }

    pub fn solution_exists(&self) -> bool {
        self.solution_path().is_file()
    }

    /// Write one project descriptor per module, then the solution descriptor.
    ///
    /// Modules whose name cannot serve as a file name inside the root (path separators,
    /// `..`, a drive prefix, a double quote) are reported as failures and left out of the
    /// solution.
    pub fn generate(&self, modules: &[Module]) -> Result<GenerationReport, GenerationError> {
        warn_on_suspicious_modules(modules);

        let mut failures = Vec::new();
        let mut projects = Vec::with_capacity(modules.len());
        let mut accepted = Vec::with_capacity(modules.len());

        for module in modules {
            if let Some(problem) = module_name_problem(&module.name) {
                tracing::warn!(
                    target: "meridian.project",
                    module = %module.name,
                    problem,
                    "skipping module with unusable name"
                );
                failures.push(WriteError {
                    path: PathBuf::from(format!("{}.{PROJECT_EXTENSION}", module.name)),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("module name {:?} {problem}", module.name),
                    ),
                });
                continue;
            }
            accepted.push(module);

            let path = self.project_path(&module.name);
            let text = render_project(module, &self.config);
            match write_file_atomic(&path, text.as_bytes()) {
                Ok(()) => {
                    tracing::debug!(
                        target: "meridian.project",
                        module = %module.name,
                        path = %path.display(),
                        "wrote project descriptor"
                    );
                    projects.push(path);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "meridian.project",
                        module = %module.name,
                        error = %err,
                        "failed to write project descriptor"
                    );
                    failures.push(err);
                }
            }
        }

        let solution = self.solution_path();
        if let Err(err) = write_file_atomic(&solution, render_solution(accepted).as_bytes()) {
            tracing::warn!(
                target: "meridian.project",
                error = %err,
                "failed to write solution descriptor"
            );
            failures.push(err);
        }

        if !failures.is_empty() {
            return Err(GenerationError { failures });
        }

        tracing::info!(
            target: "meridian.project",
            projects = projects.len(),
            solution = %solution.display(),
            "generated descriptors"
        );
        Ok(GenerationReport { projects, solution })
    }

    /// Pull the current module set from `provider` and regenerate everything.
    pub fn sync(&self, provider: &dyn ModuleProvider) -> Result<GenerationReport, SyncError> {
        let modules = provider.modules()?;
        Ok(self.generate(&modules.modules)?)
    }

    /// Regenerate everything when the host reports any asset change.
    ///
    /// The batch contents are not inspected beyond emptiness; an empty batch returns
    /// `Ok(None)` without touching the disk.
    pub fn sync_if_needed(
        &self,
        provider: &dyn ModuleProvider,
        changes: &AssetChanges,
    ) -> Result<Option<GenerationReport>, SyncError> {
        if changes.is_empty() {
            tracing::trace!(target: "meridian.project", "no asset changes; skipping sync");
            return Ok(None);
        }
        self.sync(provider).map(Some)
    }
}

/// Why `name` cannot be used verbatim as a descriptor file name, if it cannot.
fn module_name_problem(name: &str) -> Option<&'static str> {
    if name.contains('"') {
        return Some("contains a double quote");
    }
    if name.contains(['/', '\\']) {
        return Some("contains a path separator");
    }
    match Path::new(name).components().collect::<Vec<_>>().as_slice() {
        [Component::Normal(_)] => None,
        _ => Some("is not a plain file name"),
    }
}

fn warn_on_suspicious_modules(modules: &[Module]) {
    for duplicate in duplicate_modules(modules) {
        tracing::warn!(
            target: "meridian.project",
            module = %duplicate.name,
            occurrences = duplicate.indices.len(),
            "module name appears more than once; the last descriptor written wins"
        );
    }

    for (module, missing) in dangling_references(modules) {
        tracing::debug!(
            target: "meridian.project",
            module,
            reference = missing,
            "module references a module outside the current set"
        );
    }

    // Cycles are not resolved. Only direct self-references are flagged.
    for module in modules {
        if module.module_references.iter().any(|r| *r == module.name) {
            tracing::warn!(
                target: "meridian.project",
                module = %module.name,
                "module references itself; downstream tools may reject the project graph"
            );
        }
    }
}
