// Launcher: dispatches a parsed command line to the profile executor or the
// self-updater and maps the outcome to a process exit code.

use crate::command_settings::{Command, CommandSettings};
use crate::profile_executor::ProfileExecutor;
use crate::self_updater::{SelfUpdater, UpdateResult};
use anyhow::Result;
use starter_common::config_store::ProfilesStore;
use starter_common::constants::return_code;
use starter_common::host_context::HostContext;
use starter_common::tracing::Tracing;
use starter_common::version;
use starter_sdk::build_constants::{Source, StarterPackage};
use starter_sdk::{LogSink, TraceWriter};
use std::sync::Arc;

pub struct Launcher {
    context: Arc<HostContext>,
    trace: Tracing,
}

impl Launcher {
    pub fn new(context: Arc<HostContext>) -> Self {
        let trace = context.get_trace("Launcher");
        Self { context, trace }
    }

    /// Execute `settings`, writing user-facing lines to `out`.
    pub async fn execute_command(&self, settings: &CommandSettings, out: &dyn LogSink) -> Result<i32> {
        let command = settings.resolved_command();
        self.trace.info(&format!("Command: {command:?}"));

        match command {
            Command::List => self.list(settings, out),
            Command::Run { profile } => self.run(settings, &profile, out).await,
            Command::Update { owner, repo } => Ok(self.update(&owner, &repo, out).await),
            Command::Version => {
                out.log(&version::current_version_string(&self.context));
                self.trace.info(&format!(
                    "Package {} {}, commit {}",
                    StarterPackage::PACKAGE_NAME,
                    StarterPackage::VERSION,
                    Source::COMMIT_HASH
                ));
                Ok(return_code::SUCCESS)
            }
        }
    }

    fn store(&self, settings: &CommandSettings) -> ProfilesStore {
        match settings.config {
            Some(ref path) => ProfilesStore::with_path(&self.context, path),
            None => ProfilesStore::new(&self.context),
        }
    }

    fn list(&self, settings: &CommandSettings, out: &dyn LogSink) -> Result<i32> {
        let store = self.store(settings);
        let config = store.load_or_create()?;

        if config.starters.is_empty() {
            out.log(&format!(
                "No profiles configured in {}",
                store.config_path().display()
            ));
            return Ok(return_code::SUCCESS);
        }

        for (index, starter) in config.starters.iter().enumerate() {
            out.log(&format!("{}. {} ({})", index + 1, starter.name, starter.id));
        }
        Ok(return_code::SUCCESS)
    }

    async fn run(&self, settings: &CommandSettings, key: &str, out: &dyn LogSink) -> Result<i32> {
        let config = self.store(settings).load_or_create()?;

        let Some(starter) = config.find_starter(key) else {
            self.trace.warning(&format!("No profile matches '{key}'"));
            out.log(&format!("Profile '{key}' not found."));
            return Ok(return_code::TERMINATED_ERROR);
        };

        let executor = ProfileExecutor::new(self.context.clone());
        executor.run_starter(&config, starter, out).await;
        Ok(return_code::SUCCESS)
    }

    async fn update(&self, owner: &str, repo: &str, out: &dyn LogSink) -> i32 {
        let current = version::current_version_string(&self.context);
        let updater = SelfUpdater::new(self.context.clone());

        match updater.check_for_updates(owner, repo, &current, out).await {
            UpdateResult::NoUpdate | UpdateResult::UpdatingAndRestarting => return_code::SUCCESS,
            UpdateResult::Failed => {
                self.trace.warning(&format!(
                    "Update check against {} failed",
                    updater.settings().api_base_url
                ));
                return_code::TERMINATED_ERROR
            }
        }
    }
}
