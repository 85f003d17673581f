use std::cell::Cell;

use meridian_config::GenerationConfig;
use meridian_core::{Module, ModuleSet};
use meridian_project::{
    AssetChanges, ManifestProvider, ModuleProvider, ProjectGenerator, ProviderError, SyncError,
};

#[derive(Debug, Default)]
struct CountingProvider {
    calls: Cell<usize>,
}

impl ModuleProvider for CountingProvider {
    fn modules(&self) -> Result<ModuleSet, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        Ok(ModuleSet::new(vec![Module::new("Game")]))
    }
}

#[test]
fn empty_change_batch_does_not_regenerate() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ProjectGenerator::new(dir.path(), GenerationConfig::default());
    let provider = CountingProvider::default();

    let report = generator
        .sync_if_needed(&provider, &AssetChanges::default())
        .unwrap();
    assert!(report.is_none());
    assert_eq!(provider.calls.get(), 0);
    assert!(!generator.project_path("Game").exists());
}

#[test]
fn any_change_regenerates_everything() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ProjectGenerator::new(dir.path(), GenerationConfig::default());
    let provider = CountingProvider::default();

    let changes = AssetChanges {
        imported: vec!["Assets/Textures/Hero.png".into()],
        ..AssetChanges::default()
    };
    let report = generator.sync_if_needed(&provider, &changes).unwrap().unwrap();

    assert_eq!(provider.calls.get(), 1);
    assert_eq!(report.projects, vec![generator.project_path("Game")]);
    assert!(generator.solution_exists());
}

#[test]
fn sync_reads_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("modules.json");
    std::fs::write(
        &manifest,
        r#"{"modules":[{"name":"Core"},{"name":"Game","moduleReferences":["Core"]}]}"#,
    )
    .unwrap();

    let root = dir.path().join("proj");
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    let report = generator.sync(&ManifestProvider::new(&manifest)).unwrap();

    assert_eq!(report.projects.len(), 2);
    assert_eq!(report.solution, root.join("proj.sln"));
}

#[test]
fn provider_failures_surface_as_sync_errors() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ProjectGenerator::new(dir.path(), GenerationConfig::default());
    let err = generator
        .sync(&ManifestProvider::new(dir.path().join("nope.json")))
        .unwrap_err();
    assert!(matches!(err, SyncError::Provider(ProviderError::Io { .. })));
    assert!(!generator.solution_exists());
}
