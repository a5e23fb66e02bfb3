// Release feed model: the subset of a GitHub "latest release" document the
// updater reads, and asset selection for the running platform.

use serde::Deserialize;
use starter_common::constants::{self, Architecture, OsPlatform};
use starter_sdk::build_constants::StarterPackage;

/// The latest release of a repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDescriptor {
    #[serde(default, alias = "tag")]
    pub tag_name: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "downloadUrl")]
    pub browser_download_url: String,

    /// `sha256:<hex>` when the feed publishes one.
    #[serde(default)]
    pub digest: Option<String>,
}

impl ReleaseDescriptor {
    /// First asset whose name starts with `prefix` and ends with `suffix`,
    /// ignoring case. Assets without a name or download URL never match.
    pub fn find_asset(&self, prefix: &str, suffix: &str) -> Option<&ReleaseAsset> {
        let prefix = prefix.to_ascii_lowercase();
        let suffix = suffix.to_ascii_lowercase();
        self.assets.iter().find(|asset| {
            let name = asset.name.to_ascii_lowercase();
            !asset.browser_download_url.trim().is_empty()
                && name.starts_with(&prefix)
                && name.ends_with(&suffix)
        })
    }
}

impl ReleaseAsset {
    /// The expected SHA-256 in hex, if the digest uses that algorithm.
    pub fn sha256(&self) -> Option<&str> {
        let digest = self.digest.as_deref()?.trim();
        let (algorithm, value) = digest.split_once(':')?;
        (algorithm.eq_ignore_ascii_case("sha256") && !value.is_empty()).then_some(value)
    }
}

/// `sim-starter-<os>-<arch>` for the given platform.
pub fn asset_prefix_for(platform: OsPlatform, architecture: Architecture) -> String {
    format!(
        "{}-{}-{}",
        StarterPackage::PACKAGE_NAME,
        platform.package_name(),
        architecture.package_name()
    )
}

/// Asset prefix for the running platform.
pub fn default_asset_prefix() -> String {
    asset_prefix_for(constants::CURRENT_PLATFORM, constants::CURRENT_ARCHITECTURE)
}

/// Archive suffix for the running platform.
pub fn default_asset_suffix() -> &'static str {
    constants::CURRENT_PLATFORM.archive_suffix()
}
