// SelfUpdater: checks the release feed for a newer version, downloads and
// unpacks the platform package into a private staging directory, and hands
// installation over to a detached helper that runs after this process exits.

use crate::release::{self, ReleaseAsset, ReleaseDescriptor};
use crate::update_script::{self, InstallTarget};
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use starter_common::constants::{self, WellKnownDirectory};
use starter_common::host_context::HostContext;
use starter_common::tracing::Tracing;
use starter_common::version::{ReleaseVersion, VersionParseError};
use starter_common::HttpClientFactory;
use starter_sdk::{IOUtil, LogSink, TraceWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Outcome of an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    NoUpdate,
    /// The helper is running; the caller should exit promptly.
    UpdatingAndRestarting,
    Failed,
}

/// Why an update check stopped. Each one is reported as a single line.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("No release info found ({0}).")]
    NoReleaseInfo(String),

    #[error("Could not parse release version '{tag}'.")]
    UnparsableTag {
        tag: String,
        #[source]
        source: VersionParseError,
    },

    #[error("Could not parse current version '{version}'.")]
    UnparsableCurrentVersion {
        version: String,
        #[source]
        source: VersionParseError,
    },

    #[error("No suitable release asset found (wanted {prefix}*{suffix}).")]
    NoSuitableAsset { prefix: String, suffix: String },

    #[error("Download failed with HTTP {0}.")]
    DownloadStatus(u16),

    #[error("SHA256 mismatch for {asset}: expected {expected}, computed {computed}.")]
    DigestMismatch {
        asset: String,
        expected: String,
        computed: String,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("Cannot determine current executable path.")]
    ExecutableUnknown,
}

/// Where the updater looks and what it installs over.
#[derive(Debug, Clone)]
pub struct UpdaterSettings {
    pub api_base_url: String,
    pub asset_prefix: String,
    pub asset_suffix: String,
    /// Parent of the per-run staging directories.
    pub staging_root: PathBuf,
    /// How often the helper checks whether this process has exited.
    pub poll_interval: Duration,
    /// Install over this executable instead of the running one.
    pub install_target: Option<InstallTarget>,
}

impl UpdaterSettings {
    pub fn from_context(context: &HostContext) -> Self {
        Self {
            api_base_url: context.update_api_base_url(),
            asset_prefix: release::default_asset_prefix(),
            asset_suffix: release::default_asset_suffix().to_string(),
            staging_root: context.get_directory(WellKnownDirectory::Update),
            poll_interval: constants::DEFAULT_HELPER_POLL_INTERVAL,
            install_target: None,
        }
    }
}

/// Self-update against a GitHub-style release feed.
///
/// Callers must not run two checks at once; staging directories are private
/// to one check but the installation is shared.
pub struct SelfUpdater {
    context: Arc<HostContext>,
    settings: UpdaterSettings,
    trace: Tracing,
}

impl SelfUpdater {
    pub fn new(context: Arc<HostContext>) -> Self {
        let settings = UpdaterSettings::from_context(&context);
        Self::with_settings(context, settings)
    }

    pub fn with_settings(context: Arc<HostContext>, settings: UpdaterSettings) -> Self {
        let trace = context.get_trace("SelfUpdater");
        Self {
            context,
            settings,
            trace,
        }
    }

    pub fn settings(&self) -> &UpdaterSettings {
        &self.settings
    }

    /// Check `owner/repo` for a release newer than `current_version` and,
    /// if there is one, stage it and start the helper.
    ///
    /// Never returns an error: every failure becomes `Failed` plus a line in
    /// `log`.
    pub async fn check_for_updates(
        &self,
        owner: &str,
        repo: &str,
        current_version: &str,
        log: &dyn LogSink,
    ) -> UpdateResult {
        self.trace.entering("check_for_updates");
        let result = match self.try_update(owner, repo, current_version, log).await {
            Ok(result) => result,
            Err(e) => {
                self.trace.error(&format!("Update check failed: {e:#}"));
                match e.downcast_ref::<UpdateError>() {
                    Some(reason) => log.log(&reason.to_string()),
                    None => log.log(&format!("Update failed: {e:#}")),
                }
                UpdateResult::Failed
            }
        };
        self.trace.leaving("check_for_updates");
        result
    }

    async fn try_update(
        &self,
        owner: &str,
        repo: &str,
        current_version: &str,
        log: &dyn LogSink,
    ) -> Result<UpdateResult> {
        let feed_url = self.feed_url(owner, repo)?;
        let client = HttpClientFactory::create_client_for(&self.context, &feed_url)?;

        let release = self.fetch_latest_release(&client, feed_url).await?;
        let latest = ReleaseVersion::parse(&release.tag_name).map_err(|source| {
            UpdateError::UnparsableTag {
                tag: release.tag_name.clone(),
                source,
            }
        })?;
        let current = ReleaseVersion::parse(current_version).map_err(|source| {
            UpdateError::UnparsableCurrentVersion {
                version: current_version.to_string(),
                source,
            }
        })?;

        log.log(&format!("Current version: {current}, Latest: {latest}"));
        if latest.is_pre_release() {
            self.trace.warning(&format!(
                "Latest release '{}' is a pre-release; comparing on its numeric part only",
                release.tag_name
            ));
        }

        if latest <= current {
            log.log("Already on the latest version.");
            return Ok(UpdateResult::NoUpdate);
        }

        let asset = release
            .find_asset(&self.settings.asset_prefix, &self.settings.asset_suffix)
            .ok_or_else(|| UpdateError::NoSuitableAsset {
                prefix: self.settings.asset_prefix.clone(),
                suffix: self.settings.asset_suffix.clone(),
            })?;

        log.log(&format!("Downloading {} ...", asset.name));
        let staging_dir = self
            .settings
            .staging_root
            .join(uuid::Uuid::new_v4().simple().to_string());
        if let Err(e) = self.stage_and_launch(&client, asset, &staging_dir, log).await {
            if let Err(cleanup) = IOUtil::delete_directory(&staging_dir) {
                self.trace.warning(&format!(
                    "Failed to remove staging directory '{}': {cleanup:#}",
                    staging_dir.display()
                ));
            }
            return Err(e);
        }

        log.log("Updater started. The app will close and restart after update.");
        Ok(UpdateResult::UpdatingAndRestarting)
    }

    /// Download and unpack `asset` into `staging_dir`, then start the helper.
    async fn stage_and_launch(
        &self,
        client: &Client,
        asset: &ReleaseAsset,
        staging_dir: &Path,
        log: &dyn LogSink,
    ) -> Result<()> {
        tokio::fs::create_dir_all(staging_dir)
            .await
            .with_context(|| {
                format!("Failed to create staging directory '{}'", staging_dir.display())
            })?;

        let archive_path = staging_dir.join(archive_file_name(asset, &self.settings.asset_suffix));
        self.download_asset(client, asset, &archive_path).await?;

        let extracted_dir = staging_dir.join(constants::EXTRACTED_FOLDER);
        let (archive, destination) = (archive_path.clone(), extracted_dir.clone());
        tokio::task::spawn_blocking(move || extract_archive(&archive, &destination))
            .await
            .context("Extraction task panicked")??;
        log.log("Download complete. Preparing update...");

        let target = match self.settings.install_target.clone() {
            Some(target) => target,
            None => InstallTarget::current().map_err(|_| UpdateError::ExecutableUnknown)?,
        };
        self.trace.info(&format!(
            "Installing over '{}' once process {} exits",
            target.executable.display(),
            target.pid
        ));

        let script = update_script::write_helper(
            staging_dir,
            &extracted_dir,
            &target,
            self.settings.poll_interval,
        )?;
        let helper_pid = update_script::launch_detached(&script)?;
        self.trace
            .info(&format!("Update helper started with process id {helper_pid}"));

        Ok(())
    }

    fn feed_url(&self, owner: &str, repo: &str) -> Result<Url> {
        let raw = format!(
            "{}/repos/{}/{}/releases/latest",
            self.settings.api_base_url.trim_end_matches('/'),
            owner.trim(),
            repo.trim()
        );
        Url::parse(&raw).with_context(|| format!("Invalid release feed URL '{raw}'"))
    }

    async fn fetch_latest_release(&self, client: &Client, url: Url) -> Result<ReleaseDescriptor> {
        self.trace.info(&format!("Fetching release info from {url}"));

        let response = client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| UpdateError::NoReleaseInfo(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::NoReleaseInfo(format!("HTTP {}", status.as_u16())).into());
        }

        let release = response
            .json::<ReleaseDescriptor>()
            .await
            .map_err(|e| UpdateError::NoReleaseInfo(e.to_string()))?;
        Ok(release)
    }

    /// Stream `asset` to `dest`, verifying its digest when one is published.
    async fn download_asset(&self, client: &Client, asset: &ReleaseAsset, dest: &Path) -> Result<()> {
        self.trace.info(&format!(
            "Downloading '{}' from {}",
            asset.name, asset.browser_download_url
        ));

        let response = client
            .get(&asset.browser_download_url)
            .send()
            .await
            .context("Failed to send download request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::DownloadStatus(status.as_u16()).into());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create '{}'", dest.display()))?;
        let mut hasher = Sha256::new();
        let mut stream = response.bytes_stream();
        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read download stream")?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .context("Failed to write downloaded file to disk")?;
            total += chunk.len();
        }
        file.flush().await?;
        self.trace.info(&format!("Downloaded {total} bytes"));

        match asset.sha256() {
            Some(expected) => {
                let computed = hex::encode(hasher.finalize());
                if !computed.eq_ignore_ascii_case(expected) {
                    return Err(UpdateError::DigestMismatch {
                        asset: asset.name.clone(),
                        expected: expected.to_ascii_lowercase(),
                        computed,
                    }
                    .into());
                }
                self.trace.info("SHA256 digest verified");
            }
            None => self
                .trace
                .verbose("Release feed publishes no digest for this asset"),
        }

        Ok(())
    }
}

/// A safe local file name for the downloaded asset.
fn archive_file_name(asset: &ReleaseAsset, suffix: &str) -> String {
    Path::new(&asset.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("package{suffix}"))
}

/// Extract a `.tar.gz` or `.zip` archive into `dest_dir`, overwriting
/// existing files.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create '{}'", dest_dir.display()))?;

    let name = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        let file = std::fs::File::open(archive_path).context("Failed to open archive file")?;
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);
        archive.set_overwrite(true);
        archive.set_preserve_permissions(true);
        archive
            .unpack(dest_dir)
            .context("Failed to extract tar.gz archive")?;
    } else if name.ends_with(".zip") {
        let file = std::fs::File::open(archive_path).context("Failed to open zip archive")?;
        let mut archive = zip::ZipArchive::new(file).context("Failed to read zip archive")?;
        archive
            .extract(dest_dir)
            .context("Failed to extract zip archive")?;
    } else {
        return Err(UpdateError::UnsupportedArchive(name).into());
    }

    Ok(())
}
