//! Helpers for starting external programs without waiting on them.
//!
//! Editors are long-lived GUI processes: the caller hands off a literal argv, gets a pid
//! back, and keeps no relationship with the child afterwards. No shell is involved, the
//! child's standard streams are detached, and nothing waits for it to exit.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use thiserror::Error;

/// A full command invocation (cwd + program + args).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub cwd: PathBuf,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(cwd: &Path, program: &Path, args: &[String]) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            program: program.to_path_buf(),
            args: args.to_vec(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Human-readable debugging output, not a round-trippable shell snippet.
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') || arg.contains('\t') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Handle for a started process. Dropping it has no effect on the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedProcess {
    pub pid: u32,
    pub command: CommandSpec,
}

#[derive(Debug, Error)]
#[error("failed to start `{command}`: {source}")]
pub struct SpawnError {
    pub command: CommandSpec,
    #[source]
    pub source: io::Error,
}

/// Starts processes on behalf of a launcher. Tests substitute a recording implementation.
pub trait ProcessSpawner: Send + Sync + fmt::Debug {
    fn spawn(&self, command: &CommandSpec) -> Result<SpawnedProcess, SpawnError>;
}

/// Spawns the real process, detached from the caller's stdio.
#[derive(Debug, Clone, Default)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, command: &CommandSpec) -> Result<SpawnedProcess, SpawnError> {
        spawn_detached(command)
    }
}

/// Start `command` and return immediately.
///
/// On Unix the child gets its own process group so terminal signals aimed at the caller
/// (Ctrl-C in a CLI session) do not reach the editor. On Windows no console window is
/// created for the child.
pub fn spawn_detached(command: &CommandSpec) -> Result<SpawnedProcess, SpawnError> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(&command.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    unsafe {
        use std::os::unix::process::CommandExt;

        cmd.pre_exec(|| {
            // SAFETY: `setpgid` is async-signal-safe and does not allocate.
            // This is executed after `fork` in the child process.
            if libc::setpgid(0, 0) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;

        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    let mut child = cmd.spawn().map_err(|source| SpawnError {
        command: command.clone(),
        source,
    })?;
    let pid = child.id();

    tracing::debug!(
        target: "meridian.process",
        pid,
        command = %command,
        "spawned detached process"
    );

    // Reap the child when it exits so it does not linger as a zombie for the lifetime of
    // a long-running host. Nothing observes the result.
    let reaper = thread::Builder::new()
        .name(format!("meridian-reap-{pid}"))
        .spawn(move || {
            let status = child.wait();
            tracing::trace!(target: "meridian.process", pid, ?status, "detached process exited");
        });
    if let Err(err) = reaper {
        tracing::debug!(
            target: "meridian.process",
            pid,
            error = %err,
            "failed to start reaper thread; child will be reaped when the host exits"
        );
    }

    Ok(SpawnedProcess {
        pid,
        command: command.clone(),
    })
}
