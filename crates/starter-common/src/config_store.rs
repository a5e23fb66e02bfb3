// ProfilesStore: loads and saves the profile catalog (`profiles.json`).

use crate::host_context::HostContext;
use crate::profiles::ProfilesConfig;
use crate::tracing::Tracing;

use anyhow::{Context, Result};
use starter_sdk::{IOUtil, TraceWriter};
use std::path::{Path, PathBuf};

/// Handles loading and saving the profile catalog.
///
/// The catalog is plain camelCase JSON. A missing or unreadable file is
/// replaced with an empty catalog rather than reported as an error.
pub struct ProfilesStore {
    config_file_path: PathBuf,
    trace: Tracing,
}

impl ProfilesStore {
    /// Store at the context's default location.
    pub fn new(context: &HostContext) -> Self {
        Self::with_path(context, context.profiles_path())
    }

    /// Store at an explicit location.
    pub fn with_path(context: &HostContext, path: impl Into<PathBuf>) -> Self {
        let config_file_path = path.into();
        let trace = context.get_trace("ProfilesStore");
        trace.info(&format!("ConfigFilePath: {}", config_file_path.display()));
        Self {
            config_file_path,
            trace,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file_path
    }

    /// Load the catalog, creating an empty one on disk when it is missing or
    /// cannot be parsed.
    pub fn load_or_create(&self) -> Result<ProfilesConfig> {
        if !self.config_file_path.exists() {
            self.trace.info("Profiles file not found, creating an empty one");
            let empty = ProfilesConfig::default();
            self.save(&empty)?;
            return Ok(empty);
        }

        match IOUtil::load_object::<ProfilesConfig>(&self.config_file_path) {
            Ok(config) => {
                self.trace.info(&format!(
                    "Loaded {} sims, {} addons, {} starters",
                    config.sims.len(),
                    config.addons.len(),
                    config.starters.len()
                ));
                Ok(config)
            }
            Err(e) => {
                self.trace
                    .warning(&format!("Profiles file is unreadable, resetting it: {e:#}"));
                let empty = ProfilesConfig::default();
                self.save(&empty)?;
                Ok(empty)
            }
        }
    }

    /// Persist the catalog.
    pub fn save(&self, config: &ProfilesConfig) -> Result<()> {
        IOUtil::save_object(&self.config_file_path, config).with_context(|| {
            format!(
                "Failed to save profiles to '{}'",
                self.config_file_path.display()
            )
        })?;
        self.trace.info("Profiles saved");
        Ok(())
    }
}
