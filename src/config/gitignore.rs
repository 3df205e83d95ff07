//! Keeps the cache directory out of version control.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// Name of the ignore file at the project root.
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// The ignore rule for the cache directory.
pub const IGNORE_LINE: &str = ".apiscope/\n";

/// What [`ensure_gitignore`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitignoreUpdate {
    /// `.gitignore` did not exist and was created with the rule
    Created,
    /// The rule was appended to an existing `.gitignore`
    Appended,
    /// The rule was already present
    Unchanged,
}

/// Make sure `project_root/.gitignore` contains the `.apiscope/` rule.
///
/// Safe to call repeatedly; the rule is never added twice. Errors are
/// returned so the caller can report them, but initialization treats them as
/// warnings.
pub fn ensure_gitignore(project_root: &Path) -> io::Result<GitignoreUpdate> {
    let path = project_root.join(GITIGNORE_FILE_NAME);
    let rule = IGNORE_LINE.trim_end();

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::write(&path, IGNORE_LINE)?;
            tracing::debug!(path = %path.display(), "created .gitignore");
            return Ok(GitignoreUpdate::Created);
        }
        Err(e) => return Err(e),
    };

    if content.lines().any(|line| line.trim_end_matches('\r') == rule) {
        return Ok(GitignoreUpdate::Unchanged);
    }

    let mut addition = String::new();
    if !content.is_empty() && !content.ends_with('\n') {
        addition.push('\n');
    }
    addition.push_str(IGNORE_LINE);

    let mut file = OpenOptions::new().append(true).open(&path)?;
    file.write_all(addition.as_bytes())?;
    tracing::debug!(path = %path.display(), "appended cache rule to .gitignore");
    Ok(GitignoreUpdate::Appended)
}
