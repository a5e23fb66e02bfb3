use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::{fs, thread, time::Duration};

/// File-system helpers shared by the profile store and the updater.
pub struct IOUtil;

impl IOUtil {
    /// Recursively delete a directory with retry logic.
    ///
    /// If the initial removal fails (e.g. due to transient locks), the function
    /// retries up to 3 times with a small delay between attempts.
    pub fn delete_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        if path.symlink_metadata()?.file_type().is_symlink() {
            #[cfg(unix)]
            {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove symlink '{}'", path.display()))?;
            }
            #[cfg(windows)]
            {
                fs::remove_dir(path).with_context(|| {
                    format!("Failed to remove directory symlink '{}'", path.display())
                })?;
            }
            return Ok(());
        }

        let max_retries = 3;
        let mut last_err = None;

        for attempt in 0..max_retries {
            match fs::remove_dir_all(path) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(
                        "Failed to delete '{}' (attempt {}): {}",
                        path.display(),
                        attempt + 1,
                        e
                    );
                    last_err = Some(e);
                    if attempt < max_retries - 1 {
                        thread::sleep(Duration::from_millis(100 * (attempt as u64 + 1)));
                    }
                }
            }
        }

        match last_err {
            Some(e) => Err(e).with_context(|| {
                format!(
                    "Failed to delete directory '{}' after {} retries",
                    path.display(),
                    max_retries
                )
            }),
            None => Ok(()),
        }
    }

    /// Serialize a value as pretty JSON and write it to a file, creating
    /// parent directories as needed.
    pub fn save_object<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json.as_bytes())
            .with_context(|| format!("Failed to write object to '{}'", path.display()))?;
        Ok(())
    }

    /// Read a file and deserialize it from JSON.
    pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file '{}'", path.display()))?;
        let value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to deserialize JSON from '{}'", path.display()))?;
        Ok(value)
    }

    /// Mark a file as executable by its owner, group and others (no-op on Windows).
    pub fn set_executable(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o755);
            fs::set_permissions(path, perms)
                .with_context(|| format!("Failed to mark '{}' executable", path.display()))?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }

    /// Returns the directory containing the currently running executable.
    pub fn get_bin_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Failed to get current executable path")?;
        exe.parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("Executable '{}' has no parent directory", exe.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Config {
        name: String,
        count: u32,
    }

    #[test]
    fn save_and_load_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let original = Config {
            name: "test".into(),
            count: 7,
        };
        IOUtil::save_object(&path, &original).unwrap();
        let loaded: Config = IOUtil::load_object(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_object_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = IOUtil::load_object::<Config>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("deserialize"));
    }

    #[test]
    fn delete_directory_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IOUtil::delete_directory(&dir.path().join("missing")).is_ok());
    }

    #[test]
    fn delete_directory_works() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("subdir");
        fs::create_dir_all(inner.join("deeper")).unwrap();
        fs::write(inner.join("file.txt"), b"data").unwrap();
        IOUtil::delete_directory(&inner).unwrap();
        assert!(!inner.exists());
    }

    #[cfg(unix)]
    #[test]
    fn set_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        IOUtil::set_executable(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn get_bin_path_exists() {
        assert!(IOUtil::get_bin_path().unwrap().is_dir());
    }
}
