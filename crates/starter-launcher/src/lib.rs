// starter-launcher: profile execution, self-update and the `sim-starter`
// command line. Depends on `starter-sdk` and `starter-common`.
//
// Architecture:
//   main → Launcher::execute_command → list / run / update / version
//   run    → ProfileExecutor::run_starter → ProcessInvoker (per target)
//   update → SelfUpdater::check_for_updates → release feed → staging → update helper

pub mod command_settings;
pub mod launcher;
pub mod profile_executor;
pub mod release;
pub mod self_updater;
pub mod update_script;

#[cfg(test)]
mod test_support;

pub use profile_executor::{ProfileExecutor, TargetOutcome};
pub use self_updater::{SelfUpdater, UpdateError, UpdateResult, UpdaterSettings};
