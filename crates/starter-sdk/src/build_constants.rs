/// Build constants for the starter package, taken from compile-time
/// environment variables with defaults.

/// Source control information.
pub struct Source;

impl Source {
    /// The commit hash from which this binary was built.
    /// Set via the `SIM_STARTER_COMMIT_HASH` env var at compile time, or "N/A".
    pub const COMMIT_HASH: &'static str = match option_env!("SIM_STARTER_COMMIT_HASH") {
        Some(h) => h,
        None => "N/A",
    };
}

/// Starter package metadata.
#[derive(Debug, Clone)]
pub struct StarterPackage;

impl StarterPackage {
    /// The semantic version of the starter, from `Cargo.toml`.
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// The product name used for release assets, staging folders and the user agent.
    pub const PRODUCT_NAME: &'static str = "SimStarter";

    /// The release asset base name.
    /// Set via the `SIM_STARTER_PACKAGE_NAME` env var at compile time, or "sim-starter".
    pub const PACKAGE_NAME: &'static str = match option_env!("SIM_STARTER_PACKAGE_NAME") {
        Some(n) => n,
        None => "sim-starter",
    };
}
