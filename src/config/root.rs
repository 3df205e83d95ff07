//! Project root discovery.

use std::env;
use std::io;
use std::path::{self, Path, PathBuf};

use super::CONFIG_FILE_NAME;

/// Find the project root for `start`.
///
/// Walks from `start` up through every ancestor and returns the first
/// directory holding a `.git` directory or an `apiscope.ini` file. When no
/// ancestor qualifies, `start` itself is the root so that `apiscope init`
/// creates its files where it was invoked.
pub fn find_project_root(start: &Path) -> PathBuf {
    let current = absolute_root(start).unwrap_or_else(|_| start.to_path_buf());

    for dir in current.ancestors() {
        if dir.join(".git").is_dir() || dir.join(CONFIG_FILE_NAME).is_file() {
            tracing::debug!(root = %dir.display(), "found project root");
            return dir.to_path_buf();
        }
    }

    tracing::debug!(root = %current.display(), "no project marker found; using start directory");
    current
}

/// Find the project root for the current working directory.
///
/// Fails only if the current directory cannot be determined.
pub fn find_project_root_from_cwd() -> io::Result<PathBuf> {
    let cwd = env::current_dir()?;
    Ok(find_project_root(&cwd))
}

/// Make `path` absolute: canonical if it exists, otherwise joined onto the
/// current directory without touching the filesystem.
pub fn absolute_root(path: &Path) -> io::Result<PathBuf> {
    path.canonicalize().or_else(|_| path::absolute(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn canonical(dir: &TempDir) -> PathBuf {
        dir.path().canonicalize().unwrap()
    }

    #[test]
    fn test_no_markers_returns_start() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_project_root(dir.path()), canonical(&dir));
    }

    #[test]
    fn test_git_dir_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), canonical(&dir));
    }

    #[test]
    fn test_git_file_is_not_a_marker() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join(".git"), "gitdir: elsewhere\n").unwrap();

        assert_eq!(find_project_root(&nested), nested.canonicalize().unwrap());
    }

    #[test]
    fn test_config_file_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[specs]\n").unwrap();
        let nested = dir.path().join("src");
        fs::create_dir(&nested).unwrap();

        assert_eq!(find_project_root(&nested), canonical(&dir));
    }

    #[test]
    fn test_nearest_marker_wins() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("service");
        fs::create_dir(&inner).unwrap();
        fs::write(inner.join(CONFIG_FILE_NAME), "").unwrap();
        let nested = inner.join("src");
        fs::create_dir(&nested).unwrap();

        assert_eq!(find_project_root(&nested), inner.canonicalize().unwrap());
    }

    #[test]
    fn test_result_is_ancestor_of_start() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("x").join("y").join("z");
        fs::create_dir_all(&nested).unwrap();

        let start = nested.canonicalize().unwrap();
        for candidate in [start.clone(), start.join(".."), dir.path().to_path_buf()] {
            let root = find_project_root(&candidate);
            assert!(candidate.canonicalize().unwrap().starts_with(&root));
        }
    }

    #[test]
    fn test_missing_start_is_returned_as_is() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert_eq!(find_project_root(&missing), missing);
    }

    #[test]
    fn test_absolute_root_of_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert_eq!(absolute_root(&missing).unwrap(), missing);
    }

    #[test]
    #[serial]
    fn test_relative_start_is_made_absolute() {
        let dir = TempDir::new().unwrap();
        let previous = env::current_dir().unwrap();
        env::set_current_dir(dir.path()).unwrap();
        let root = find_project_root(Path::new("."));
        let missing = absolute_root(Path::new("not-yet-created"));
        env::set_current_dir(previous).unwrap();

        assert!(root.is_absolute());
        assert_eq!(root, canonical(&dir));
        let missing = missing.unwrap();
        assert!(missing.is_absolute());
        assert!(missing.ends_with("not-yet-created"));
    }

    #[test]
    #[serial]
    fn test_from_cwd() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("deep");
        fs::create_dir(&nested).unwrap();

        let previous = env::current_dir().unwrap();
        env::set_current_dir(&nested).unwrap();
        let root = find_project_root_from_cwd().unwrap();
        env::set_current_dir(previous).unwrap();

        assert_eq!(root, canonical(&dir));
    }
}
