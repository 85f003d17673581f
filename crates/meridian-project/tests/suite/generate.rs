use std::path::{Path, PathBuf};

use meridian_config::GenerationConfig;
use meridian_core::{Module, ProjectId};
use meridian_project::ProjectGenerator;

fn project_root() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("MyGame");
    std::fs::create_dir_all(&root).unwrap();
    (dir, root)
}

fn project_references(path: &Path) -> Vec<(String, String)> {
    let text = std::fs::read_to_string(path).unwrap();
    let doc = roxmltree::Document::parse(&text).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name("ProjectReference"))
        .map(|n| {
            let child = |tag: &str| {
                n.children()
                    .find(|c| c.has_tag_name(tag))
                    .and_then(|c| c.text())
                    .unwrap_or_default()
                    .to_owned()
            };
            (child("Name"), child("Project"))
        })
        .collect()
}

/// `(name, braced id)` for every project declared in a solution file.
fn solution_entries(path: &Path) -> Vec<(String, String)> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| line.starts_with("Project("))
        .map(|line| {
            let quoted: Vec<&str> = line.split('"').skip(1).step_by(2).collect();
            // [type, name, file, id]
            (quoted[1].to_owned(), quoted[3].to_owned())
        })
        .collect()
}

fn a_and_b() -> Vec<Module> {
    vec![
        Module::new("A").with_source("Assets/A/Thing.cs"),
        Module::new("B")
            .with_source("Assets/B/Other.cs")
            .with_module_reference("A"),
    ]
}

#[test]
fn dependent_module_references_its_dependency() {
    let (_dir, root) = project_root();
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());

    let report = generator.generate(&a_and_b()).unwrap();

    assert_eq!(
        report.projects,
        vec![root.join("A.csproj"), root.join("B.csproj")]
    );
    assert_eq!(report.solution, root.join("MyGame.sln"));

    assert!(project_references(&root.join("A.csproj")).is_empty());
    assert_eq!(
        project_references(&root.join("B.csproj")),
        vec![("A".to_owned(), ProjectId::for_name("A").braced())]
    );

    assert_eq!(
        solution_entries(&root.join("MyGame.sln")),
        vec![
            ("A".to_owned(), ProjectId::for_name("A").braced()),
            ("B".to_owned(), ProjectId::for_name("B").braced()),
        ]
    );
}

#[test]
fn project_reference_ids_match_solution_entries() {
    let (_dir, root) = project_root();
    let modules = vec![
        Module::new("Core"),
        Module::new("Net").with_module_reference("Core"),
        Module::new("Game")
            .with_module_reference("Core")
            .with_module_reference("Net"),
        Module::new("Game.Editor").with_module_reference("Game"),
    ];
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    let report = generator.generate(&modules).unwrap();

    let solution: std::collections::HashMap<String, String> =
        solution_entries(&report.solution).into_iter().collect();
    assert_eq!(solution.len(), modules.len());

    for module in &modules {
        let text = std::fs::read_to_string(generator.project_path(&module.name)).unwrap();
        let doc = roxmltree::Document::parse(&text).unwrap();
        let own_id = doc
            .descendants()
            .find(|n| n.has_tag_name("ProjectGuid"))
            .and_then(|n| n.text())
            .unwrap();
        assert_eq!(own_id, solution[&module.name]);

        for (name, id) in project_references(&generator.project_path(&module.name)) {
            assert_eq!(id, solution[&name], "{} -> {name}", module.name);
        }
    }
}

#[test]
fn regeneration_is_byte_identical() {
    let (_dir, root) = project_root();
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    let modules = vec![
        Module::new("A")
            .with_define("UNITY_EDITOR")
            .with_compiled_reference("/lib/UnityEngine.dll")
            .with_source("Assets/A.cs"),
        Module::new("B").with_module_reference("A"),
    ];

    let read_all = |report: &meridian_project::GenerationReport| -> Vec<Vec<u8>> {
        report
            .projects
            .iter()
            .chain(std::iter::once(&report.solution))
            .map(|path| std::fs::read(path).unwrap())
            .collect()
    };

    let first = generator.generate(&modules).unwrap();
    let first_bytes = read_all(&first);
    let second = generator.generate(&modules).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_bytes, read_all(&second));
}

#[test]
fn existing_descriptors_are_fully_overwritten() {
    let (_dir, root) = project_root();
    let stale = "x".repeat(64 * 1024);
    std::fs::write(root.join("A.csproj"), &stale).unwrap();
    std::fs::write(root.join("MyGame.sln"), &stale).unwrap();

    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    generator.generate(&[Module::new("A")]).unwrap();

    let project = std::fs::read_to_string(root.join("A.csproj")).unwrap();
    assert!(project.starts_with("<?xml"));
    assert!(!project.contains("xxxx"));
    let solution = std::fs::read_to_string(root.join("MyGame.sln")).unwrap();
    assert!(solution.starts_with("Microsoft Visual Studio Solution File"));
    assert!(!solution.contains("xxxx"));
}

#[test]
fn cyclic_references_are_rendered_without_recursing() {
    let (_dir, root) = project_root();
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    let modules = vec![
        Module::new("A").with_module_reference("B"),
        Module::new("B").with_module_reference("A"),
    ];

    generator.generate(&modules).unwrap();

    assert_eq!(
        project_references(&root.join("A.csproj")),
        vec![("B".to_owned(), ProjectId::for_name("B").braced())]
    );
    assert_eq!(
        project_references(&root.join("B.csproj")),
        vec![("A".to_owned(), ProjectId::for_name("A").braced())]
    );
}

#[test]
fn a_failed_module_does_not_stop_the_others() {
    let (_dir, root) = project_root();
    // A directory where the descriptor should go makes that single write fail.
    std::fs::create_dir_all(root.join("Broken.csproj")).unwrap();

    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    let modules = vec![
        Module::new("First"),
        Module::new("Broken"),
        Module::new("Last"),
    ];

    let err = generator.generate(&modules).unwrap_err();
    let failed: Vec<PathBuf> = err.paths().map(Path::to_path_buf).collect();
    assert_eq!(failed, vec![root.join("Broken.csproj")]);
    assert!(err.to_string().contains("Broken.csproj"), "{err}");

    assert!(root.join("First.csproj").is_file());
    assert!(root.join("Last.csproj").is_file());
    assert_eq!(
        solution_entries(&root.join("MyGame.sln"))
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>(),
        vec!["First", "Broken", "Last"]
    );

    // Retrying after the obstruction is gone regenerates everything.
    std::fs::remove_dir(root.join("Broken.csproj")).unwrap();
    let report = generator.generate(&modules).unwrap();
    assert_eq!(report.projects.len(), 3);
}

#[test]
fn solution_is_named_after_the_project_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Space Game");
    std::fs::create_dir_all(&root).unwrap();

    let generator = ProjectGenerator::new(&root, GenerationConfig::default());
    assert_eq!(generator.solution_path(), root.join("Space Game.sln"));
    assert!(!generator.solution_exists());

    generator.generate(&[]).unwrap();
    assert!(generator.solution_exists());
}

#[test]
fn unusable_module_names_are_rejected_without_escaping_the_root() {
    let (dir, root) = project_root();
    let outside = dir.path().join("outside");
    let generator = ProjectGenerator::new(&root, GenerationConfig::default());

    let modules = vec![
        Module::new(outside.join("Evil").display().to_string()),
        Module::new("../Escaped"),
        Module::new("Say \"Hi\""),
        Module::new("Good"),
    ];
    let err = generator.generate(&modules).unwrap_err();

    assert_eq!(err.failures.len(), 3);
    assert!(err
        .failures
        .iter()
        .all(|failure| failure.source.kind() == std::io::ErrorKind::InvalidInput));
    assert!(!outside.join("Evil.csproj").exists());
    assert!(!dir.path().join("Escaped.csproj").exists());

    assert!(root.join("Good.csproj").is_file());
    let entries = solution_entries(&generator.solution_path());
    assert_eq!(
        entries,
        vec![(
            "Good".to_owned(),
            ProjectId::for_name("Good").braced()
        )]
    );
}
