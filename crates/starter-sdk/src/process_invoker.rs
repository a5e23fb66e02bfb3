use crate::path_util::PathUtil;
use crate::string_util::StringUtil;
use crate::trace::TraceWriter;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

/// Programs tried, in order, to satisfy an elevation request on Unix.
pub const ELEVATION_HELPERS: &[&str] = &["pkexec", "sudo"];

/// Host used to raise a UAC prompt on Windows.
pub const WINDOWS_ELEVATION_HOST: &str = "powershell.exe";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Everything needed to start one external process.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    pub file_name: &'a Path,
    /// Passed through as-is; never interpreted by the launcher beyond what
    /// the platform needs to build an argument vector.
    pub arguments: &'a str,
    pub working_directory: &'a Path,
    pub elevated: bool,
}

/// The concrete program/argument vector a `LaunchRequest` turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Appended verbatim to the command line (Windows only).
    pub raw_arguments: Option<String>,
}

/// Exit status of a process observed by the invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub elapsed: Duration,
}

/// Starts external processes, optionally elevated, and hands back a
/// `RunningProcess` the caller can wait on with or without a bound.
pub struct ProcessInvoker {
    trace: Arc<dyn TraceWriter>,
}

impl ProcessInvoker {
    /// Create a new `ProcessInvoker` with the given trace writer.
    pub fn new(trace: Arc<dyn TraceWriter>) -> Self {
        Self { trace }
    }

    /// Start the process described by `request`.
    ///
    /// Fails when the elevation helper is unavailable or the OS refuses to
    /// create the process.
    pub fn start(&self, request: &LaunchRequest<'_>) -> Result<RunningProcess> {
        self.trace.info("Starting process:");
        self.trace
            .info(&format!("  File name: '{}'", request.file_name.display()));
        self.trace
            .info(&format!("  Arguments: '{}'", request.arguments));
        self.trace.info(&format!(
            "  Working directory: '{}'",
            request.working_directory.display()
        ));
        self.trace
            .info(&format!("  Elevated: '{}'", request.elevated));

        let plan = self.plan(request)?;
        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args);

        #[cfg(windows)]
        {
            if let Some(raw) = plan.raw_arguments.as_deref() {
                cmd.raw_arg(raw);
            }
            if plan.program == Path::new(WINDOWS_ELEVATION_HOST) {
                cmd.creation_flags(CREATE_NO_WINDOW);
            }
        }

        if request.working_directory.is_dir() {
            cmd.current_dir(request.working_directory);
        }

        cmd.stdin(Stdio::null());

        let started = Instant::now();
        let child = cmd.spawn().with_context(|| {
            format!(
                "Failed to start process '{}' with arguments '{}'",
                plan.program.display(),
                request.arguments
            )
        })?;

        let pid = child.id().unwrap_or(0);
        self.trace
            .info(&format!("Process started with process id {pid}."));

        Ok(RunningProcess {
            child,
            pid,
            started,
            trace: self.trace.clone(),
        })
    }

    /// Build the command for this platform, resolving elevation first.
    pub fn plan(&self, request: &LaunchRequest<'_>) -> Result<CommandPlan> {
        #[cfg(unix)]
        {
            let wrapper = if request.elevated {
                resolve_unix_elevation()?
            } else {
                None
            };
            if let Some(ref w) = wrapper {
                self.trace
                    .verbose(&format!("Elevating through '{}'", w.display()));
            }
            Ok(plan_unix(request, wrapper.as_deref()))
        }

        #[cfg(not(unix))]
        {
            Ok(plan_windows(request, request.elevated))
        }
    }
}

/// `None` when the current user is already root.
#[cfg(unix)]
fn resolve_unix_elevation() -> Result<Option<PathBuf>> {
    if nix::unistd::geteuid().is_root() {
        return Ok(None);
    }

    ELEVATION_HELPERS
        .iter()
        .find_map(|helper| which::which(helper).ok())
        .map(Some)
        .with_context(|| {
            format!(
                "Elevation requested but none of [{}] was found on PATH",
                ELEVATION_HELPERS.join(", ")
            )
        })
}

#[cfg_attr(not(unix), allow(dead_code))]
fn plan_unix(request: &LaunchRequest<'_>, wrapper: Option<&Path>) -> CommandPlan {
    let program = PathUtil::resolve_program_path(request.file_name);
    let split = StringUtil::shell_split(request.arguments);

    match wrapper {
        Some(wrapper) => {
            let mut args = Vec::with_capacity(split.len() + 1);
            args.push(program.to_string_lossy().into_owned());
            args.extend(split);
            CommandPlan {
                program: wrapper.to_path_buf(),
                args,
                raw_arguments: None,
            }
        }
        None => CommandPlan {
            program,
            args: split,
            raw_arguments: None,
        },
    }
}

#[cfg_attr(unix, allow(dead_code))]
fn plan_windows(request: &LaunchRequest<'_>, run_as: bool) -> CommandPlan {
    let program = PathUtil::resolve_program_path(request.file_name);

    if !run_as {
        return CommandPlan {
            program,
            args: Vec::new(),
            raw_arguments: (!request.arguments.is_empty()).then(|| request.arguments.to_string()),
        };
    }

    let mut script = format!(
        "$p = Start-Process -FilePath {} -WorkingDirectory {} -Verb RunAs -PassThru",
        ps_quote(&program.to_string_lossy()),
        ps_quote(&request.working_directory.to_string_lossy()),
    );
    if !request.arguments.is_empty() {
        script.push_str(&format!(" -ArgumentList {}", ps_quote(request.arguments)));
    }
    script.push_str("; $p.WaitForExit(); exit $p.ExitCode");

    CommandPlan {
        program: PathBuf::from(WINDOWS_ELEVATION_HOST),
        args: vec![
            "-NoProfile".into(),
            "-NonInteractive".into(),
            "-WindowStyle".into(),
            "Hidden".into(),
            "-Command".into(),
            script,
        ],
        raw_arguments: None,
    }
}

#[cfg_attr(unix, allow(dead_code))]
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A started child process. Dropping it (or calling `detach`) leaves the
/// process running.
pub struct RunningProcess {
    child: Child,
    pid: u32,
    started: Instant,
    trace: Arc<dyn TraceWriter>,
}

impl RunningProcess {
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Time since just before the process was spawned.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Block until the process exits.
    pub async fn wait_for_exit(&mut self) -> Result<ProcessExit> {
        let status = self
            .child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for process {}", self.pid))?;
        let exit = ProcessExit {
            exit_code: status.code().unwrap_or(-1),
            elapsed: self.started.elapsed(),
        };
        self.trace.info(&format!(
            "Finished process {} with exit code {}, and elapsed time {:.2?}.",
            self.pid, exit.exit_code, exit.elapsed
        ));
        Ok(exit)
    }

    /// Wait at most `window` for the process to exit on its own.
    ///
    /// Returns `None` if it is still running when the window closes.
    pub async fn wait_for_exit_within(&mut self, window: Duration) -> Result<Option<ProcessExit>> {
        match tokio::time::timeout(window, self.wait_for_exit()).await {
            Ok(exit) => exit.map(Some),
            Err(_) => {
                self.trace.info(&format!(
                    "Process {} still running after {:.1}s.",
                    self.pid,
                    window.as_secs_f64()
                ));
                Ok(None)
            }
        }
    }

    /// Stop tracking the process without terminating it.
    pub fn detach(self) -> u32 {
        self.trace
            .verbose(&format!("Detached from process {}.", self.pid));
        self.pid
    }
}
