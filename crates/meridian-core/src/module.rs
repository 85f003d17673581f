use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A compiled unit of source code as reported by the host's compilation pipeline.
///
/// `module_references` name other modules; only the name is needed to render a
/// reference, so a name missing from the module set is still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub source_files: Vec<PathBuf>,
    /// Preprocessor defines in the order the host reports them. Duplicates are kept.
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub compiled_references: Vec<PathBuf>,
    #[serde(default)]
    pub module_references: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_files.push(path.into());
        self
    }

    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.push(define.into());
        self
    }

    pub fn with_compiled_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiled_references.push(path.into());
        self
    }

    pub fn with_module_reference(mut self, name: impl Into<String>) -> Self {
        self.module_references.push(name.into());
        self
    }
}

/// A module name that appears more than once in a [`ModuleSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateModule {
    pub name: String,
    /// Positions of every occurrence, in input order.
    pub indices: Vec<usize>,
}

/// Ordered module list, usually loaded from a JSON module manifest:
///
/// ```json
/// { "modules": [ { "name": "Game", "sourceFiles": ["Assets/Game.cs"], "moduleReferences": ["Core"] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleSet {
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl ModuleSet {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// See [`duplicate_modules`].
    pub fn duplicates(&self) -> Vec<DuplicateModule> {
        duplicate_modules(&self.modules)
    }

    /// See [`dangling_references`].
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        dangling_references(&self.modules)
    }
}

/// Names that occur more than once, in first-occurrence order.
///
/// Module names must be unique because the name seeds both the descriptor file name and
/// the project identifier.
pub fn duplicate_modules(modules: &[Module]) -> Vec<DuplicateModule> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut order = Vec::new();
    for (idx, module) in modules.iter().enumerate() {
        let entry = seen.entry(module.name.as_str()).or_default();
        if entry.is_empty() {
            order.push(module.name.as_str());
        }
        entry.push(idx);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let indices = seen.remove(name)?;
            (indices.len() > 1).then(|| DuplicateModule {
                name: name.to_owned(),
                indices,
            })
        })
        .collect()
}

/// `(module, referenced name)` pairs whose referenced name is not in `modules`.
pub fn dangling_references(modules: &[Module]) -> Vec<(&str, &str)> {
    let known: HashSet<&str> = modules.iter().map(|module| module.name.as_str()).collect();
    modules
        .iter()
        .flat_map(|module| {
            module
                .module_references
                .iter()
                .filter(|name| !known.contains(name.as_str()))
                .map(move |name| (module.name.as_str(), name.as_str()))
        })
        .collect()
}

impl From<Vec<Module>> for ModuleSet {
    fn from(modules: Vec<Module>) -> Self {
        Self::new(modules)
    }
}
