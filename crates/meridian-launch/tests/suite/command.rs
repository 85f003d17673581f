use std::path::PathBuf;
use std::sync::Arc;

use meridian_launch::{EditorSettings, HostPlatform, LaunchRequest, Launcher};

use super::{launcher, touch, RecordingSpawner};

fn root_arg(root: &std::path::Path) -> String {
    root.display().to_string()
}

#[test]
fn no_target_passes_only_the_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("bin/antigravity");
    touch(&exe);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(&exe, &LaunchRequest::workspace());
    assert_eq!(command.program, exe);
    assert_eq!(command.args, vec![root_arg(dir.path())]);
    assert_eq!(command.cwd, dir.path());

    let command = launcher.command_for(&exe, &LaunchRequest::file("").at(3, 4));
    assert_eq!(command.args, vec![root_arg(dir.path())]);
}

#[test]
fn line_without_column_goes_to_column_one() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Foo.cs");
    touch(&file);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(
        &dir.path().join("antigravity"),
        &LaunchRequest::file(&file).at(12, 0),
    );
    assert_eq!(
        command.args,
        vec![
            root_arg(dir.path()),
            "--goto".to_owned(),
            format!("{}:12:1", file.display()),
        ]
    );
}

#[test]
fn line_and_column_are_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Assets/Player.cs");
    touch(&file);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(
        &dir.path().join("antigravity"),
        &LaunchRequest::file(&file).at(7, 15),
    );
    assert_eq!(command.args[2], format!("{}:7:15", file.display()));
}

#[test]
fn file_without_line_is_passed_bare() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Foo.cs");
    touch(&file);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(&dir.path().join("antigravity"), &LaunchRequest::file(&file));
    assert_eq!(
        command.args,
        vec![root_arg(dir.path()), file.display().to_string()]
    );
}

#[test]
fn relative_targets_resolve_against_the_project_root() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Assets/Scripts/Enemy.cs");
    touch(&file);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(
        &dir.path().join("antigravity"),
        &LaunchRequest::file("Assets/Scripts/Enemy.cs").at(2, 3),
    );
    assert_eq!(command.args[2], format!("{}:2:3", file.display()));
}

#[test]
fn missing_target_opens_the_workspace_only() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(
        &dir.path().join("antigravity"),
        &LaunchRequest::file(dir.path().join("Gone.cs")).at(12, 1),
    );
    assert_eq!(command.args, vec![root_arg(dir.path())]);
}

#[test]
fn empty_goto_flag_passes_the_position_alone() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Foo.cs");
    touch(&file);
    let settings = EditorSettings {
        goto_flag: String::new(),
        ..EditorSettings::default()
    };
    let launcher = Launcher::new(
        dir.path(),
        settings,
        HostPlatform::Windows,
        Arc::new(RecordingSpawner::default()),
    );

    let command = launcher.command_for(
        &dir.path().join("Antigravity.exe"),
        &LaunchRequest::file(&file).at(5, 2),
    );
    assert_eq!(
        command.args,
        vec![root_arg(dir.path()), format!("{}:5:2", file.display())]
    );
}

#[test]
fn macos_bundles_launch_through_the_bundle_helper() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Foo.cs");
    touch(&file);
    let bundle = PathBuf::from("/Applications/Antigravity.app");
    let launcher = launcher(dir.path(), HostPlatform::MacOs, Arc::default());

    let command = launcher.command_for(&bundle, &LaunchRequest::file(&file).at(12, 0));
    assert_eq!(command.program, PathBuf::from("/usr/bin/open"));
    assert_eq!(
        command.args,
        vec![
            "-a".to_owned(),
            "/Applications/Antigravity.app".to_owned(),
            "-n".to_owned(),
            "--args".to_owned(),
            root_arg(dir.path()),
            "--goto".to_owned(),
            format!("{}:12:1", file.display()),
        ]
    );
}

#[test]
fn macos_direct_executables_skip_the_bundle_helper() {
    let dir = tempfile::tempdir().unwrap();
    let exe = PathBuf::from("/Applications/Antigravity.app/Contents/MacOS/Antigravity");
    let launcher = launcher(dir.path(), HostPlatform::MacOs, Arc::default());

    let command = launcher.command_for(&exe, &LaunchRequest::workspace());
    assert_eq!(command.program, exe);
    assert_eq!(command.args, vec![root_arg(dir.path())]);
}

#[test]
fn bundle_directories_elsewhere_resolve_their_executable() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("Antigravity.app");
    let exe = bundle.join("Contents/MacOS/Antigravity");
    touch(&exe);
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(&bundle, &LaunchRequest::workspace());
    assert_eq!(command.program, exe);
}

#[test]
fn unresolvable_bundle_falls_back_to_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("Antigravity.app");
    std::fs::create_dir_all(bundle.join("Contents/MacOS")).unwrap();
    let launcher = launcher(dir.path(), HostPlatform::Linux, Arc::default());

    let command = launcher.command_for(&bundle, &LaunchRequest::workspace());
    assert_eq!(command.program, bundle);
}
