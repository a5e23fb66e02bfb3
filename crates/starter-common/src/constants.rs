// Constants shared across the starter: platform detection, well-known
// directories and files, environment variable names and timing defaults.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Well-known directories used by the starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownDirectory {
    /// Directory holding the running executable (the install directory).
    Root,
    /// Parent of every per-attempt update staging directory.
    Update,
}

impl fmt::Display for WellKnownDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsPlatform {
    Linux,
    MacOS,
    Windows,
}

impl fmt::Display for OsPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsPlatform::Linux => write!(f, "Linux"),
            OsPlatform::MacOS => write!(f, "OSX"),
            OsPlatform::Windows => write!(f, "Windows"),
        }
    }
}

impl OsPlatform {
    /// Short name used in release asset names.
    pub fn package_name(&self) -> &'static str {
        match self {
            OsPlatform::Linux => "linux",
            OsPlatform::MacOS => "osx",
            OsPlatform::Windows => "win",
        }
    }

    /// Archive suffix of the release package for this platform.
    pub fn archive_suffix(&self) -> &'static str {
        match self {
            OsPlatform::Windows => ".zip",
            OsPlatform::Linux | OsPlatform::MacOS => ".tar.gz",
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X64,
    Arm,
    Arm64,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "X86"),
            Architecture::X64 => write!(f, "X64"),
            Architecture::Arm => write!(f, "ARM"),
            Architecture::Arm64 => write!(f, "ARM64"),
        }
    }
}

impl Architecture {
    /// Short name used in release asset names.
    pub fn package_name(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }
}

// ---------------------------------------------------------------------------
// Platform detection (compile-time)
// ---------------------------------------------------------------------------

/// The current OS platform, detected at compile time.
#[cfg(target_os = "linux")]
pub const CURRENT_PLATFORM: OsPlatform = OsPlatform::Linux;
#[cfg(target_os = "macos")]
pub const CURRENT_PLATFORM: OsPlatform = OsPlatform::MacOS;
#[cfg(target_os = "windows")]
pub const CURRENT_PLATFORM: OsPlatform = OsPlatform::Windows;
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const CURRENT_PLATFORM: OsPlatform = OsPlatform::Linux; // default fallback

/// The current CPU architecture, detected at compile time.
#[cfg(target_arch = "x86")]
pub const CURRENT_ARCHITECTURE: Architecture = Architecture::X86;
#[cfg(target_arch = "x86_64")]
pub const CURRENT_ARCHITECTURE: Architecture = Architecture::X64;
#[cfg(target_arch = "arm")]
pub const CURRENT_ARCHITECTURE: Architecture = Architecture::Arm;
#[cfg(target_arch = "aarch64")]
pub const CURRENT_ARCHITECTURE: Architecture = Architecture::Arm64;
#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "arm",
    target_arch = "aarch64"
)))]
pub const CURRENT_ARCHITECTURE: Architecture = Architecture::X64; // default fallback

// ---------------------------------------------------------------------------
// Files and folders
// ---------------------------------------------------------------------------

/// Profile catalog file name, stored beside the executable.
pub const PROFILES_FILE_NAME: &str = "profiles.json";

/// Version override file looked up beside the executable and in the working directory.
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Folder (under the OS temp dir) holding per-attempt update staging directories.
pub const UPDATE_STAGING_FOLDER: &str = "SimStarterUpdate";

/// Name of the extraction folder inside a staging directory.
pub const EXTRACTED_FOLDER: &str = "extracted";

// ---------------------------------------------------------------------------
// Timing defaults
// ---------------------------------------------------------------------------

/// How long a non-waited process must survive to count as started.
pub const DEFAULT_LIVENESS_WINDOW: Duration = Duration::from_secs(2);

/// Delay between process-table polls in the update helper.
pub const DEFAULT_HELPER_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Update feed
// ---------------------------------------------------------------------------

pub mod update {
    /// Base URL of the release API.
    pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

    /// Repository owner publishing starter releases.
    pub const DEFAULT_OWNER: &str = "simstarter";

    /// Repository publishing starter releases.
    pub const DEFAULT_REPO: &str = "sim-starter";
}

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

pub mod variables {
    /// Echo diagnostic trace lines to stdout.
    pub const PRINT_LOG_TO_STDOUT: &str = "SIM_STARTER_PRINT_LOG_TO_STDOUT";

    /// Skip TLS certificate validation for update downloads.
    pub const TLS_NO_VERIFY: &str = "SIM_STARTER_TLS_NO_VERIFY";

    /// Override the release API base URL.
    pub const UPDATE_API_URL: &str = "SIM_STARTER_UPDATE_API_URL";

    /// Override the liveness window, in milliseconds.
    pub const LIVENESS_WINDOW_MS: &str = "SIM_STARTER_LIVENESS_WINDOW_MS";

    /// Override the profile catalog location.
    pub const CONFIG: &str = "SIM_STARTER_CONFIG";
}

// ---------------------------------------------------------------------------
// Return codes
// ---------------------------------------------------------------------------

pub mod return_code {
    pub const SUCCESS: i32 = 0;
    pub const TERMINATED_ERROR: i32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_suffix_per_platform() {
        assert_eq!(OsPlatform::Windows.archive_suffix(), ".zip");
        assert_eq!(OsPlatform::Linux.archive_suffix(), ".tar.gz");
        assert_eq!(OsPlatform::MacOS.archive_suffix(), ".tar.gz");
    }

    #[test]
    fn package_names() {
        assert_eq!(OsPlatform::MacOS.package_name(), "osx");
        assert_eq!(Architecture::Arm64.package_name(), "arm64");
    }

    #[test]
    fn liveness_default_is_two_seconds() {
        assert_eq!(DEFAULT_LIVENESS_WINDOW, Duration::from_secs(2));
    }
}
