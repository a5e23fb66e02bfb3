// Update helper: the script that waits for the running instance to exit,
// mirrors the extracted package over the installation and relaunches it.
// The package is copied before anything is removed; a failed copy leaves the
// installation in place and nothing is relaunched.
// Written into the staging directory and started fully detached.

use anyhow::{Context, Result};
use starter_sdk::{IOUtil, StringUtil};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

pub const UNIX_SCRIPT_NAME: &str = "update.sh";
pub const WINDOWS_SCRIPT_NAME: &str = "update.cmd";

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// The installation being replaced: which executable, and which process
/// must be gone before its directory is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub executable: PathBuf,
    pub pid: u32,
}

impl InstallTarget {
    /// The running process.
    pub fn current() -> Result<Self> {
        let executable =
            std::env::current_exe().context("Cannot determine current executable path.")?;
        Ok(Self {
            executable,
            pid: std::process::id(),
        })
    }

    pub fn install_dir(&self) -> Result<&Path> {
        self.executable
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .with_context(|| {
                format!(
                    "Executable '{}' has no parent directory",
                    self.executable.display()
                )
            })
    }

    pub fn executable_name(&self) -> Result<String> {
        self.executable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| {
                format!("Executable '{}' has no file name", self.executable.display())
            })
    }
}

/// POSIX `sh` helper.
pub fn render_unix(source: &Path, target: &InstallTarget, poll_interval: Duration) -> Result<String> {
    let install_dir = target.install_dir()?;
    let exe_name = target.executable_name()?;

    Ok(format!(
        r#"#!/bin/sh
# Generated by sim-starter. Replaces the installation once process {pid} exits.
SRC={src}
DST={dst}
EXE={exe}
PID={pid}

while kill -0 "$PID" 2>/dev/null; do
  sleep {poll}
done

cp -R "$SRC/." "$DST/" || exit 1

(cd "$DST" && find . -depth ! -name . -print) | while IFS= read -r rel; do
  if [ ! -e "$SRC/$rel" ] && [ ! -L "$SRC/$rel" ]; then
    rm -rf "$DST/$rel"
  fi
done
chmod +x "$DST/$EXE" 2>/dev/null || true

cd "$DST" || exit 1
nohup "$DST/$EXE" >/dev/null 2>&1 &
"#,
        pid = target.pid,
        src = StringUtil::sh_quote(&source.to_string_lossy()),
        dst = StringUtil::sh_quote(&install_dir.to_string_lossy()),
        exe = StringUtil::sh_quote(&exe_name),
        poll = sleep_seconds(poll_interval),
    ))
}

/// `cmd.exe` helper.
pub fn render_windows(
    source: &Path,
    target: &InstallTarget,
    poll_interval: Duration,
) -> Result<String> {
    let install_dir = target.install_dir()?;
    let exe_name = target.executable_name()?;
    // One echo per second after the first. `timeout` fails without a console.
    let pings = poll_interval.as_secs().max(1) + 1;

    Ok(format!(
        "@echo off\r\n\
         setlocal\r\n\
         set \"SRC={src}\"\r\n\
         set \"DST={dst}\"\r\n\
         :wait\r\n\
         tasklist /FI \"PID eq {pid}\" | find \"{pid}\" >nul\r\n\
         if %ERRORLEVEL%==0 (\r\n\
         \x20 ping -n {pings} 127.0.0.1 >nul\r\n\
         \x20 goto wait\r\n\
         )\r\n\
         robocopy \"%SRC%\" \"%DST%\" /MIR >nul\r\n\
         if %ERRORLEVEL% GEQ 8 exit /b 1\r\n\
         start \"\" \"%DST%\\{exe}\"\r\n\
         endlocal\r\n",
        src = source.display(),
        dst = install_dir.display(),
        pid = target.pid,
        exe = exe_name,
        pings = pings,
    ))
}

/// Write the helper for this platform into `staging_dir`.
pub fn write_helper(
    staging_dir: &Path,
    source: &Path,
    target: &InstallTarget,
    poll_interval: Duration,
) -> Result<PathBuf> {
    let (name, script) = if cfg!(windows) {
        (WINDOWS_SCRIPT_NAME, render_windows(source, target, poll_interval)?)
    } else {
        (UNIX_SCRIPT_NAME, render_unix(source, target, poll_interval)?)
    };

    let script_path = staging_dir.join(name);
    std::fs::write(&script_path, script)
        .with_context(|| format!("Failed to write update helper '{}'", script_path.display()))?;
    IOUtil::set_executable(&script_path)?;
    Ok(script_path)
}

/// Start the helper so that it outlives this process. Returns its pid.
pub fn launch_detached(script_path: &Path) -> Result<u32> {
    let mut cmd = detached_command(script_path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let child = cmd
        .spawn()
        .with_context(|| format!("Failed to start update helper '{}'", script_path.display()))?;
    Ok(child.id())
}

#[cfg(unix)]
fn detached_command(script_path: &Path) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("/bin/sh");
    cmd.arg(script_path).process_group(0);
    cmd
}

#[cfg(windows)]
fn detached_command(script_path: &Path) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd.exe");
    cmd.raw_arg(format!("/c \"{}\"", script_path.display()))
        .creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
    cmd
}

fn sleep_seconds(interval: Duration) -> String {
    if interval.subsec_millis() == 0 {
        interval.as_secs().max(1).to_string()
    } else {
        format!("{:.3}", interval.as_secs_f64())
    }
}
