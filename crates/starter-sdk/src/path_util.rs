use std::path::{Path, PathBuf};

/// Extensions the OS can start directly even when the file is not found on
/// disk (it may still resolve through `PATH` or the shell).
pub const DIRECTLY_EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "cmd"];

/// Path utility functions for launch target paths.
pub struct PathUtil;

impl PathUtil {
    /// Trim whitespace and strip one layer of surrounding double quotes.
    ///
    /// Blank input yields an empty string.
    pub fn normalize_path(path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }

        trimmed.to_string()
    }

    /// Whether the path has an extension the OS treats as directly executable
    /// (`.exe`, `.bat`, `.cmd`, case-insensitive).
    pub fn looks_like_executable(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                DIRECTLY_EXECUTABLE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// The directory a launched process should start in: the parent of
    /// `path`, or the current working directory when it has none.
    pub fn resolve_working_directory(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::absolute(parent),
            _ => Self::current_dir(),
        }
    }

    /// Make a relative path that exists on disk absolute, so it still
    /// resolves after the child changes its working directory. Bare names
    /// and missing paths are returned unchanged for `PATH` lookup.
    pub fn resolve_program_path(path: &Path) -> PathBuf {
        if path.is_relative() && path.exists() {
            Self::absolute(path)
        } else {
            path.to_path_buf()
        }
    }

    fn absolute(path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Self::current_dir().join(path)
        }
    }

    fn current_dir() -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_unquotes() {
        assert_eq!(PathUtil::normalize_path("  \"C:\\Sims\\sim.exe\"  "), "C:\\Sims\\sim.exe");
        assert_eq!(PathUtil::normalize_path("/opt/sim/run.sh"), "/opt/sim/run.sh");
    }

    #[test]
    fn normalize_strips_only_one_layer() {
        assert_eq!(PathUtil::normalize_path("\"\"x\"\""), "\"x\"");
    }

    #[test]
    fn normalize_blank_is_empty() {
        assert_eq!(PathUtil::normalize_path(""), "");
        assert_eq!(PathUtil::normalize_path("   \t "), "");
        assert_eq!(PathUtil::normalize_path("\"\""), "");
    }

    #[test]
    fn normalize_keeps_lone_quote() {
        assert_eq!(PathUtil::normalize_path("\""), "\"");
    }

    #[test]
    fn executable_extensions() {
        assert!(PathUtil::looks_like_executable(Path::new("sim.exe")));
        assert!(PathUtil::looks_like_executable(Path::new("START.BAT")));
        assert!(PathUtil::looks_like_executable(Path::new("tools/run.Cmd")));
        assert!(!PathUtil::looks_like_executable(Path::new("run.sh")));
        assert!(!PathUtil::looks_like_executable(Path::new("noext")));
    }

    #[test]
    fn working_directory_is_parent() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("app.sh");
        assert_eq!(PathUtil::resolve_working_directory(&exe), dir.path());
    }

    #[test]
    fn working_directory_falls_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(PathUtil::resolve_working_directory(Path::new("notepad.exe")), cwd);
    }

    #[test]
    fn program_path_bare_name_unchanged() {
        assert_eq!(
            PathUtil::resolve_program_path(Path::new("definitely-not-here-xyz")),
            PathBuf::from("definitely-not-here-xyz")
        );
    }
}
