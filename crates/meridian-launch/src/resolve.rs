use std::fmt;
use std::path::{Path, PathBuf};

use meridian_config::EditorConfig;

/// Where to look for the real executable inside an installation directory.
///
/// `candidates` are tried in order, relative to the installation. When none exists the
/// first regular file (by name) in `binary_dir` is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableCandidates {
    pub candidates: Vec<PathBuf>,
    pub binary_dir: PathBuf,
}

impl ExecutableCandidates {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            candidates: config.executable_candidates.clone(),
            binary_dir: config.binary_dir.clone(),
        }
    }
}

/// Probing found nothing and the installation path is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionWarning {
    pub installation: PathBuf,
    pub tried: Vec<PathBuf>,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no executable found in {} (tried {} candidates); using the installation path directly",
            self.installation.display(),
            self.tried.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The installation path is not a directory and is executed directly.
    Direct(PathBuf),
    /// A configured candidate exists.
    Candidate(PathBuf),
    /// First file found in the binary directory.
    BinaryDirEntry(PathBuf),
    Unresolved(ResolutionWarning),
}

impl Resolution {
    pub fn path(&self) -> &Path {
        match self {
            Resolution::Direct(path)
            | Resolution::Candidate(path)
            | Resolution::BinaryDirEntry(path) => path,
            Resolution::Unresolved(warning) => &warning.installation,
        }
    }

    pub fn warning(&self) -> Option<&ResolutionWarning> {
        match self {
            Resolution::Unresolved(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Map an installation path to the executable to run.
pub fn resolve_executable(installation: &Path, candidates: &ExecutableCandidates) -> Resolution {
    if !installation.is_dir() {
        return Resolution::Direct(installation.to_path_buf());
    }

    let mut tried = Vec::with_capacity(candidates.candidates.len() + 1);
    for candidate in &candidates.candidates {
        let path = installation.join(candidate);
        if path.is_file() {
            return Resolution::Candidate(path);
        }
        tried.push(path);
    }

    let binary_dir = installation.join(&candidates.binary_dir);
    if let Some(path) = first_file_in(&binary_dir) {
        return Resolution::BinaryDirEntry(path);
    }
    tried.push(binary_dir);

    Resolution::Unresolved(ResolutionWarning {
        installation: installation.to_path_buf(),
        tried,
    })
}

fn first_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files.into_iter().next()
}
