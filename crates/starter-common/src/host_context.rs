// HostContext: the process-wide application context. Resolves well-known
// directories, creates named trace sources and exposes runtime settings.

use crate::constants::{self, WellKnownDirectory};
use crate::tracing::{TraceManager, TraceSetting, Tracing};

use starter_sdk::{build_constants, IOUtil, StringUtil};
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The central application context.
///
/// Created once by the front end and shared (behind an `Arc`) with the
/// executor and the updater.
pub struct HostContext {
    /// The host type string (e.g. "Launcher").
    host_type: String,

    /// Trace manager for creating per-component trace sources.
    trace_manager: TraceManager,

    /// Override for the root directory (used in tests).
    root_override: Mutex<Option<PathBuf>>,
}

impl HostContext {
    /// Create a new `HostContext`.
    pub fn new(host_type: impl Into<String>) -> Arc<Self> {
        let host_type = host_type.into();
        assert!(!host_type.is_empty(), "host_type must not be empty");

        let print_to_stdout = env::var(constants::variables::PRINT_LOG_TO_STDOUT)
            .ok()
            .and_then(|v| StringUtil::convert_to_bool(&v))
            .unwrap_or(false);

        let trace_setting = TraceSetting {
            print_to_stdout,
            ..TraceSetting::default()
        };

        Arc::new(Self {
            host_type,
            trace_manager: TraceManager::with_setting(trace_setting),
            root_override: Mutex::new(None),
        })
    }

    /// The host type this context was created for.
    pub fn host_type(&self) -> &str {
        &self.host_type
    }

    /// Get (create) a named trace source.
    pub fn get_trace(&self, name: &str) -> Tracing {
        self.trace_manager.get(name)
    }

    // -----------------------------------------------------------------------
    // Directories
    // -----------------------------------------------------------------------

    /// Point `Root` somewhere else (tests, portable installs).
    pub fn set_root_override(&self, root: impl Into<PathBuf>) {
        if let Ok(mut guard) = self.root_override.lock() {
            *guard = Some(root.into());
        }
    }

    /// Resolve a well-known directory.
    pub fn get_directory(&self, directory: WellKnownDirectory) -> PathBuf {
        match directory {
            WellKnownDirectory::Root => self.root_directory(),
            WellKnownDirectory::Update => {
                env::temp_dir().join(constants::UPDATE_STAGING_FOLDER)
            }
        }
    }

    fn root_directory(&self) -> PathBuf {
        if let Ok(guard) = self.root_override.lock() {
            if let Some(ref root) = *guard {
                return root.clone();
            }
        }

        IOUtil::get_bin_path()
            .or_else(|_| env::current_dir())
            .unwrap_or_else(|_| PathBuf::from("."))
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Default location of the profile catalog, honoring `SIM_STARTER_CONFIG`.
    pub fn profiles_path(&self) -> PathBuf {
        match env::var(constants::variables::CONFIG) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => self
                .get_directory(WellKnownDirectory::Root)
                .join(constants::PROFILES_FILE_NAME),
        }
    }

    /// The bounded wait used for non-waited targets.
    pub fn liveness_window(&self) -> Duration {
        env::var(constants::variables::LIVENESS_WINDOW_MS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(constants::DEFAULT_LIVENESS_WINDOW)
    }

    /// Base URL of the release API, honoring `SIM_STARTER_UPDATE_API_URL`.
    pub fn update_api_base_url(&self) -> String {
        match env::var(constants::variables::UPDATE_API_URL) {
            Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => constants::update::DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// User agent sent with every HTTP request.
    pub fn user_agent(&self) -> String {
        format!(
            "{}-Updater/{}",
            build_constants::StarterPackage::PRODUCT_NAME,
            build_constants::StarterPackage::VERSION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_override_wins() {
        let context = HostContext::new("Test");
        let dir = tempfile::tempdir().unwrap();
        context.set_root_override(dir.path());
        assert_eq!(context.get_directory(WellKnownDirectory::Root), dir.path());
    }

    #[test]
    fn update_directory_is_under_temp() {
        let context = HostContext::new("Test");
        let update = context.get_directory(WellKnownDirectory::Update);
        assert!(update.starts_with(env::temp_dir()));
        assert!(update.ends_with(constants::UPDATE_STAGING_FOLDER));
    }

    #[test]
    fn user_agent_names_product() {
        let context = HostContext::new("Test");
        assert!(context.user_agent().starts_with("SimStarter-Updater/"));
        assert_eq!(context.host_type(), "Test");
    }

    #[test]
    fn trace_sources_are_named() {
        let context = HostContext::new("Test");
        assert_eq!(context.get_trace("Updater").name(), "Updater");
    }
}
