// starter-common: Shared services and infrastructure for Sim Starter.
// Depends on `starter-sdk`; consumed by the launcher crate.

pub mod config_store;
pub mod constants;
pub mod host_context;
pub mod http_client_factory;
pub mod profiles;
pub mod tracing;
pub mod version;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use config_store::ProfilesStore;
pub use constants::{
    Architecture, OsPlatform, WellKnownDirectory, CURRENT_ARCHITECTURE, CURRENT_PLATFORM,
};
pub use host_context::HostContext;
pub use http_client_factory::HttpClientFactory;
pub use profiles::{LaunchTarget, ProfilesConfig, ResolvedProfile, StarterProfile};
pub use tracing::{TraceEventType, TraceManager, TraceSetting, Tracing};
pub use version::{normalize_version_string, ReleaseVersion, VersionParseError};
