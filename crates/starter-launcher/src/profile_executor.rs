// ProfileExecutor: starts the targets of a starter profile in order and
// reports one status line per target to the caller's log sink.

use starter_common::host_context::HostContext;
use starter_common::profiles::{LaunchTarget, ProfilesConfig, StarterProfile};
use starter_common::tracing::Tracing;
use starter_sdk::{LaunchRequest, LogSink, PathUtil, ProcessInvoker, TraceWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const SEPARATOR_WIDTH: usize = 40;

/// What happened to a single target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutcome {
    /// No path configured.
    Skipped,
    /// Path missing on disk and not something the OS can resolve itself.
    NotFound,
    /// Process creation failed.
    LaunchFailed,
    /// Waited target ran to completion.
    Completed { exit_code: i32, elapsed: Duration },
    /// Non-waited target exited inside the liveness window.
    ExitedEarly { exit_code: i32, elapsed: Duration },
    /// Non-waited target survived the liveness window.
    Started { elapsed: Duration },
}

/// Runs starter profiles.
///
/// Nothing escapes `run_starter`: every problem becomes a line in the log
/// sink and the run moves on to the next target.
pub struct ProfileExecutor {
    trace: Tracing,
    invoker: ProcessInvoker,
    liveness_window: Duration,
}

impl ProfileExecutor {
    pub fn new(context: Arc<HostContext>) -> Self {
        let trace = context.get_trace("ProfileExecutor");
        let invoker = ProcessInvoker::new(Arc::new(context.get_trace("ProcessInvoker")));
        Self {
            trace,
            invoker,
            liveness_window: context.liveness_window(),
        }
    }

    /// Override how long a non-waited target must survive to count as started.
    pub fn with_liveness_window(mut self, window: Duration) -> Self {
        self.liveness_window = window;
        self
    }

    pub fn liveness_window(&self) -> Duration {
        self.liveness_window
    }

    /// Run `starter`: its sim first, then its addons in catalog order.
    pub async fn run_starter(
        &self,
        config: &ProfilesConfig,
        starter: &StarterProfile,
        log: &dyn LogSink,
    ) -> Vec<TargetOutcome> {
        self.trace.entering("run_starter");
        log.log("");
        log.log(&format!("Starting: {}", starter.name));
        log.log(&"-".repeat(SEPARATOR_WIDTH));

        let outcomes = match config.resolve(starter) {
            Some(resolved) => {
                let targets: Vec<&LaunchTarget> = resolved.targets().collect();
                self.run_targets(&targets, log).await
            }
            None => {
                self.trace.warning(&format!(
                    "Starter '{}' references unknown sim '{}'",
                    starter.name, starter.sim_id
                ));
                log.log("[ERROR] No primary target found for this profile.");
                Vec::new()
            }
        };

        log.log("");
        log.log("All configured apps have been started (or attempted).");
        self.trace.leaving("run_starter");
        outcomes
    }

    /// Launch `targets` one after another.
    pub async fn run_targets(
        &self,
        targets: &[&LaunchTarget],
        log: &dyn LogSink,
    ) -> Vec<TargetOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.launch_target(target, log).await);
        }
        outcomes
    }

    async fn launch_target(&self, target: &LaunchTarget, log: &dyn LogSink) -> TargetOutcome {
        let name = &target.name;
        let path = PathUtil::normalize_path(&target.path);
        if path.is_empty() {
            log.log(&format!("[SKIP] {name}: No path configured."));
            return TargetOutcome::Skipped;
        }

        let file = Path::new(&path);
        if !file.exists() && !PathUtil::looks_like_executable(file) {
            log.log(&format!("[WARN] {name}: File not found: {path}"));
            return TargetOutcome::NotFound;
        }

        let working_directory = PathUtil::resolve_working_directory(file);
        log.log(format!("[RUN] {name}: {path} {}", target.arguments).trim_end());

        let request = LaunchRequest {
            file_name: file,
            arguments: &target.arguments,
            working_directory: &working_directory,
            elevated: target.elevated,
        };

        let mut process = match self.invoker.start(&request) {
            Ok(process) => process,
            Err(e) => {
                self.trace.error(&format!("Launching '{name}' failed: {e:#}"));
                log.log(&format!("[ERROR] {name}: {e:#}"));
                return TargetOutcome::LaunchFailed;
            }
        };

        if target.wait_for_exit {
            return match process.wait_for_exit().await {
                Ok(exit) => {
                    log.log(&format!(
                        "[DONE] {name} exited with code {} in {:.1}s.",
                        exit.exit_code,
                        exit.elapsed.as_secs_f64()
                    ));
                    TargetOutcome::Completed {
                        exit_code: exit.exit_code,
                        elapsed: exit.elapsed,
                    }
                }
                Err(e) => {
                    log.log(&format!("[ERROR] {name}: {e:#}"));
                    TargetOutcome::LaunchFailed
                }
            };
        }

        match process.wait_for_exit_within(self.liveness_window).await {
            Ok(Some(exit)) => {
                log.log(&format!(
                    "[WARN] {name} exited early with code {} after {:.1}s.",
                    exit.exit_code,
                    exit.elapsed.as_secs_f64()
                ));
                TargetOutcome::ExitedEarly {
                    exit_code: exit.exit_code,
                    elapsed: exit.elapsed,
                }
            }
            Ok(None) => {
                let elapsed = process.elapsed();
                process.detach();
                log.log(&format!(
                    "[OK] {name} started in {:.1}s.",
                    elapsed.as_secs_f64()
                ));
                TargetOutcome::Started { elapsed }
            }
            Err(e) => {
                log.log(&format!("[ERROR] {name}: {e:#}"));
                TargetOutcome::LaunchFailed
            }
        }
    }
}
