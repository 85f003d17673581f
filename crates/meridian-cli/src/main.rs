use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use meridian_config::{ConfigDiagnostics, MeridianConfig};
use meridian_core::{ModuleSet, ProjectId};
use meridian_launch::{CodeEditor, ExternalEditor, HostPlatform, LaunchRequest, Launcher};
use meridian_process::{CommandSpec, DetachedSpawner};
use meridian_project::{GenerationReport, ManifestProvider, ModuleProvider, ProjectGenerator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "meridian",
    version,
    about = "Meridian (C# workspace descriptors and external editor launching)"
)]
struct Cli {
    /// Project root (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate every `.csproj` and the `.sln` from a module manifest
    Sync(SyncArgs),
    /// Open the project (optionally at a file position) in the external editor
    Open(OpenArgs),
    /// List configured editor installations present on this machine
    Installations(InstallationsArgs),
    /// Print the project identifier for one or more module names
    Id(IdArgs),
}

#[derive(Args)]
struct SyncArgs {
    /// JSON module manifest
    #[arg(long)]
    modules: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct OpenArgs {
    /// File to open, absolute or relative to the project root
    file: Option<PathBuf>,
    /// 1-based line; 0 means none
    #[arg(long)]
    line: Option<u32>,
    /// 1-based column; 0 means none
    #[arg(long)]
    column: Option<u32>,
    /// Editor installation to use (defaults to the first configured one on disk)
    #[arg(long)]
    installation: Option<PathBuf>,
    /// JSON module manifest used if the solution has to be generated first
    #[arg(long)]
    modules: Option<PathBuf>,
    /// Print the command instead of running it
    #[arg(long)]
    dry_run: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InstallationsArgs {
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct IdArgs {
    /// Module names
    #[arg(required = true)]
    names: Vec<String>,
    /// Print identifiers wrapped in braces, as they appear in descriptors
    #[arg(long)]
    braced: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Id(args) => {
            let ids: Vec<IdOutput> = args
                .names
                .iter()
                .map(|name| {
                    let id = ProjectId::for_name(name);
                    IdOutput {
                        name: name.clone(),
                        id: if args.braced { id.braced() } else { id.to_string() },
                    }
                })
                .collect();
            print_output(&ids, args.json)?;
            Ok(0)
        }
        Command::Sync(args) => {
            let (root, config) = open_project(&cli.root)?;
            let generator = ProjectGenerator::new(&root, config.generation.clone());
            let provider = ManifestProvider::new(&args.modules);
            match generator.sync(&provider) {
                Ok(report) => {
                    print_output(&SyncOutput::from(report), args.json)?;
                    Ok(0)
                }
                Err(err) => {
                    eprintln!("error: {:#}", anyhow::Error::new(err));
                    Ok(1)
                }
            }
        }
        Command::Open(args) => {
            let (root, config) = open_project(&cli.root)?;
            open(&root, &config, args)
        }
        Command::Installations(args) => {
            let (root, config) = open_project(&cli.root)?;
            let editor = external_editor(&root, &config, Box::new(ModuleSet::default()));
            let installations: Vec<InstallationOutput> = editor
                .installations()
                .into_iter()
                .map(|installation| InstallationOutput {
                    name: installation.name,
                    path: installation.path,
                })
                .collect();
            print_output(&installations, args.json)?;
            Ok(0)
        }
    }
}

fn open(root: &Path, config: &MeridianConfig, args: OpenArgs) -> Result<i32> {
    let editor = external_editor(root, config, Box::new(ModuleSet::default()));
    let manifest = args.modules.as_deref().map(ManifestProvider::new);

    let installation = match args.installation {
        Some(path) => path,
        None => match editor.installations().into_iter().next() {
            Some(installation) => installation.path,
            None => {
                eprintln!(
                    "error: no {} installation found; pass --installation",
                    editor.name()
                );
                return Ok(1);
            }
        },
    };

    let request = LaunchRequest {
        file: args.file,
        line: args.line,
        column: args.column,
    };

    if args.dry_run {
        let command = editor.launcher().command_for(&installation, &request);
        print_output(&CommandOutput::from(&command), args.json)?;
        return Ok(0);
    }

    // Without a manifest a missing solution stays missing instead of being written empty.
    let provider = manifest
        .as_ref()
        .map(|manifest| manifest as &dyn ModuleProvider);
    match editor
        .launcher()
        .launch(&installation, &request, editor.generator(), provider)
    {
        Ok(process) => {
            print_output(
                &LaunchOutput {
                    pid: process.pid,
                    command: CommandOutput::from(&process.command),
                },
                args.json,
            )?;
            Ok(0)
        }
        Err(err) => {
            eprintln!("error: {:#}", anyhow::Error::new(err));
            Ok(1)
        }
    }
}

/// Canonicalize the project root, load its configuration and install logging.
fn open_project(root: &Path) -> Result<(PathBuf, MeridianConfig)> {
    let root = root
        .canonicalize()
        .with_context(|| format!("project root {} is not accessible", root.display()))?;
    let config = load_config(&root)?;
    meridian_config::init_tracing(&config.logging);
    Ok((root, config))
}

fn load_config(root: &Path) -> Result<MeridianConfig> {
    let (config, path, diagnostics) =
        meridian_config::load_for_project(root).context("failed to load configuration")?;
    let source = path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "configuration".to_owned());
    report_config_diagnostics(&source, &diagnostics);

    if !diagnostics.is_ok() {
        anyhow::bail!(
            "{source}: {} invalid configuration value(s)",
            diagnostics.errors.len()
        );
    }
    Ok(config)
}

fn report_config_diagnostics(source: &str, diagnostics: &ConfigDiagnostics) {
    for key in &diagnostics.unknown_keys {
        eprintln!("warning: {source}: unknown key `{key}`");
    }
    for warning in &diagnostics.warnings {
        eprintln!("warning: {source}: {warning}");
    }
    for error in &diagnostics.errors {
        eprintln!("error: {source}: {error}");
    }
}

fn external_editor(
    root: &Path,
    config: &MeridianConfig,
    provider: Box<dyn ModuleProvider>,
) -> ExternalEditor {
    let launcher = Launcher::new(
        root,
        config.editor.clone(),
        HostPlatform::current(),
        Arc::new(DetachedSpawner),
    );
    let generator = ProjectGenerator::new(root, config.generation.clone());
    ExternalEditor::new(launcher, generator, provider)
}

#[derive(Serialize)]
struct IdOutput {
    name: String,
    id: String,
}

#[derive(Serialize)]
struct SyncOutput {
    projects: Vec<PathBuf>,
    solution: PathBuf,
}

impl From<GenerationReport> for SyncOutput {
    fn from(report: GenerationReport) -> Self {
        Self {
            projects: report.projects,
            solution: report.solution,
        }
    }
}

#[derive(Serialize)]
struct CommandOutput {
    cwd: PathBuf,
    program: PathBuf,
    args: Vec<String>,
}

impl From<&CommandSpec> for CommandOutput {
    fn from(command: &CommandSpec) -> Self {
        Self {
            cwd: command.cwd.clone(),
            program: command.program.clone(),
            args: command.args.clone(),
        }
    }
}

#[derive(Serialize)]
struct LaunchOutput {
    pid: u32,
    command: CommandOutput,
}

#[derive(Serialize)]
struct InstallationOutput {
    name: String,
    path: PathBuf,
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
        return Ok(());
    }

    // Human output for key types. Everything else falls back to pretty JSON.
    let any = value as &dyn std::any::Any;
    if let Some(ids) = any.downcast_ref::<Vec<IdOutput>>() {
        for entry in ids {
            println!("{}\t{}", entry.id, entry.name);
        }
    } else if let Some(report) = any.downcast_ref::<SyncOutput>() {
        for project in &report.projects {
            println!("wrote {}", project.display());
        }
        println!("wrote {}", report.solution.display());
    } else if let Some(command) = any.downcast_ref::<CommandOutput>() {
        println!("{}", render_command(command));
    } else if let Some(launch) = any.downcast_ref::<LaunchOutput>() {
        println!("launched (pid {}): {}", launch.pid, render_command(&launch.command));
    } else if let Some(installations) = any.downcast_ref::<Vec<InstallationOutput>>() {
        if installations.is_empty() {
            println!("no installations found");
        }
        for installation in installations {
            println!("{}\t{}", installation.name, installation.path.display());
        }
    } else {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    }
    Ok(())
}

fn render_command(command: &CommandOutput) -> String {
    CommandSpec::new(&command.cwd, &command.program, &command.args).to_string()
}
