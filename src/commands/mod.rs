//! Command implementations for the apiscope CLI.
//!
//! Each command works on a [`ConfigSession`] opened once by `main` and returns
//! a result that can be printed as JSON or as human-readable text:
//! - `init` - Create the registry section, cache directory and `.gitignore` rule
//! - `list` - Show configured specifications with their source type
//! - `add` / `remove` - Edit the registry
//! - `show` - Look up a single specification

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{ConfigSession, GitignoreUpdate, InitReport, SourceKind, SpecEntry};
use crate::{Error, Result};

/// Sources longer than this are truncated in human output.
const MAX_SOURCE_WIDTH: usize = 60;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

fn truncate_source(source: &str) -> String {
    if source.chars().count() > MAX_SOURCE_WIDTH {
        let head: String = source.chars().take(MAX_SOURCE_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        source.to_string()
    }
}

// === init ===

/// Initialize apiscope for the project.
pub fn init(session: &mut ConfigSession) -> Result<InitReport> {
    session.ensure_initialized()
}

impl Output for InitReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Initialized apiscope in {}",
            self.project_root.display()
        )];

        let config = self.config_path.display();
        lines.push(if self.template_written {
            format!("  Created example configuration: {}", config)
        } else if self.already_initialized {
            format!("  Configuration already exists: {}", config)
        } else {
            format!("  Updated existing configuration: {}", config)
        });
        lines.push(format!("  Cache directory: {}", self.cache_dir.display()));
        lines.push(match (&self.gitignore, &self.gitignore_warning) {
            (Some(GitignoreUpdate::Created), _) => "  Created .gitignore".to_string(),
            (Some(GitignoreUpdate::Appended), _) => "  Updated .gitignore".to_string(),
            (Some(GitignoreUpdate::Unchanged), _) => {
                "  .gitignore already ignores .apiscope/".to_string()
            }
            (None, Some(warning)) => format!("  Could not update .gitignore: {}", warning),
            (None, None) => "  Could not update .gitignore".to_string(),
        });

        lines.push(String::new());
        lines.push("Next steps:".to_string());
        lines.push("  Edit apiscope.ini to add API specifications".to_string());
        lines.push("  Run `apiscope list` to view configured APIs".to_string());
        lines.join("\n")
    }
}

// === list ===

/// Result of `apiscope list`.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub initialized: bool,
    pub config_path: PathBuf,
    pub specs: Vec<SpecEntry>,
}

/// List configured specifications.
///
/// An uninitialized project is not an error here; the result says so and
/// the human output points at `apiscope init`.
pub fn list(session: &ConfigSession) -> Result<ListResult> {
    let (initialized, specs) = match session.require_initialized() {
        Ok(registry) => (true, registry.specifications()),
        Err(Error::NotInitialized) => (false, Vec::new()),
        Err(e) => return Err(e),
    };
    Ok(ListResult {
        initialized,
        config_path: session.config_path().to_path_buf(),
        specs,
    })
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if !self.initialized {
            return "Configuration not initialized.\nRun `apiscope init` first.".to_string();
        }

        if self.specs.is_empty() {
            return format!(
                "No API specifications found in {}.\n\n\
                 Add lines to apiscope.ini: <name> = <source>\n\
                 Source types: URL (http://...), FILE (./... or ../...)",
                self.config_path.display()
            );
        }

        let mut lines = vec![format!(
            "{} API specification(s) in {}:",
            self.specs.len(),
            self.config_path.display()
        )];
        for spec in &self.specs {
            lines.push(format!(
                "  {} ({}): {}",
                spec.name,
                spec.kind,
                truncate_source(spec.cleaned_source())
            ));
        }

        if self.specs.iter().any(|s| s.kind == SourceKind::Invalid) {
            lines.push(String::new());
            lines.push("Format guidance for invalid entries:".to_string());
            lines.push("  Use ./ or ../ for local files".to_string());
            lines.push("  Use http:// or https:// for URLs".to_string());
        }
        lines.join("\n")
    }
}

// === add ===

/// Result of `apiscope add`.
#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    #[serde(flatten)]
    pub spec: SpecEntry,
    pub config_path: PathBuf,
    /// The `[specs]` section did not exist and was created by this add
    pub section_created: bool,
}

/// Add a specification and save the configuration.
pub fn add(session: &mut ConfigSession, name: &str, source: &str) -> Result<AddResult> {
    let section_created = !session.is_initialized();
    session.registry_mut().add(name, source)?;
    session.save()?;
    tracing::debug!(name, source, "added specification");

    Ok(AddResult {
        spec: SpecEntry::new(name, source),
        config_path: session.config_path().to_path_buf(),
        section_created,
    })
}

impl Output for AddResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "Added {} ({}): {}",
            self.spec.name,
            self.spec.kind,
            self.spec.cleaned_source()
        );
        if self.spec.kind == SourceKind::Invalid {
            out.push_str("\n  Note: use ./ or ../ for local files, http:// or https:// for URLs");
        }
        out
    }
}

// === remove ===

/// Result of `apiscope remove`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResult {
    pub name: String,
    pub removed: bool,
}

/// Remove a specification, saving only if something changed.
pub fn remove(session: &mut ConfigSession, name: &str) -> Result<RemoveResult> {
    let removed = session.require_initialized_mut()?.remove(name);
    if removed {
        session.save()?;
        tracing::debug!(name, "removed specification");
    }
    Ok(RemoveResult {
        name: name.to_string(),
        removed,
    })
}

impl Output for RemoveResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.removed {
            format!("Removed {}", self.name)
        } else {
            format!("No specification named {}", self.name)
        }
    }
}

// === show ===

/// Look up a single specification.
pub fn show(session: &ConfigSession, name: &str) -> Result<SpecEntry> {
    let registry = session.require_initialized()?;
    registry
        .get(name)
        .map(|source| SpecEntry::new(name, source))
        .ok_or_else(|| Error::NotFound(name.to_string()))
}

impl Output for SpecEntry {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("{} ({}): {}", self.name, self.kind, self.cleaned_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use std::fs;
    use tempfile::TempDir;

    fn session_with(content: &str) -> (TempDir, ConfigSession) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), content).unwrap();
        let session = ConfigSession::open(Some(dir.path())).unwrap();
        (dir, session)
    }

    fn fresh_session() -> (TempDir, ConfigSession) {
        let dir = TempDir::new().unwrap();
        let session = ConfigSession::open(Some(dir.path())).unwrap();
        (dir, session)
    }

    #[test]
    fn test_truncate_source() {
        assert_eq!(truncate_source("./short.yaml"), "./short.yaml");
        let long = format!("https://{}", "a".repeat(60));
        let shown = truncate_source(&long);
        assert_eq!(shown.chars().count(), 60);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate_source(&"b".repeat(60)), "b".repeat(60));
    }

    #[test]
    fn test_init_human_output() {
        let (_dir, mut session) = fresh_session();
        let report = init(&mut session).unwrap();
        let human = report.to_human();
        assert!(human.contains("Created example configuration"));
        assert!(human.contains("Created .gitignore"));
        assert!(human.contains("Next steps:"));

        let again = init(&mut session).unwrap().to_human();
        assert!(again.contains("Configuration already exists"));
        assert!(again.contains(".gitignore already ignores .apiscope/"));
    }

    #[test]
    fn test_init_json_output() {
        let (_dir, mut session) = fresh_session();
        let json = init(&mut session).unwrap().to_json();
        assert!(json.contains("\"already_initialized\":false"));
        assert!(json.contains("\"template_written\":true"));
        assert!(json.contains("\"gitignore\":\"created\""));
        assert!(!json.contains("gitignore_warning"));
    }

    #[test]
    fn test_list_uninitialized_is_not_error() {
        let (_dir, session) = fresh_session();
        let result = list(&session).unwrap();
        assert!(!result.initialized);
        assert!(result.to_human().contains("apiscope init"));
    }

    #[test]
    fn test_list_empty_registry() {
        let (_dir, session) = session_with("[specs]\n");
        let result = list(&session).unwrap();
        assert!(result.initialized);
        assert!(result.specs.is_empty());
        assert!(result.to_human().contains("No API specifications found"));
    }

    #[test]
    fn test_list_entries_with_types() {
        let (_dir, session) =
            session_with("[specs]\nfoo = ./x.yaml\nbar = \"https://bar\"\nbaz = api/x.yaml\n");
        let result = list(&session).unwrap();
        let names: Vec<_> = result.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar", "baz"]);

        let human = result.to_human();
        assert!(human.contains("  foo (FILE): ./x.yaml"));
        assert!(human.contains("  bar (URL): https://bar"));
        assert!(human.contains("  baz (INVALID): api/x.yaml"));
        assert!(human.contains("Format guidance for invalid entries"));

        let json = result.to_json();
        assert!(json.contains(r#"{"name":"bar","source":"\"https://bar\"","type":"URL"}"#));
    }

    #[test]
    fn test_list_without_invalid_has_no_guidance() {
        let (_dir, session) = session_with("[specs]\nfoo = ./x.yaml\n");
        assert!(!list(&session).unwrap().to_human().contains("guidance"));
    }

    #[test]
    fn test_add_saves() {
        let (dir, mut session) = session_with("[specs]\n");
        let result = add(&mut session, "foo", "./x.yaml").unwrap();
        assert!(!result.section_created);
        assert_eq!(result.spec.kind, SourceKind::File);
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap(),
            "[specs]\nfoo = ./x.yaml\n"
        );
        assert!(result.to_json().contains("\"type\":\"FILE\""));
    }

    #[test]
    fn test_add_uninitialized_creates_section() {
        let (_dir, mut session) = fresh_session();
        let result = add(&mut session, "foo", "https://x").unwrap();
        assert!(result.section_created);
        assert!(session.is_initialized());
    }

    #[test]
    fn test_add_duplicate_does_not_save() {
        let (dir, mut session) = session_with("[specs]\nfoo = ./x.yaml\n");
        let err = add(&mut session, "foo", "./y.yaml").unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap(),
            "[specs]\nfoo = ./x.yaml\n"
        );
    }

    #[test]
    fn test_add_invalid_kind_has_note() {
        let (_dir, mut session) = fresh_session();
        let human = add(&mut session, "foo", "api.yaml").unwrap().to_human();
        assert!(human.starts_with("Added foo (INVALID): api.yaml"));
        assert!(human.contains("Note:"));
    }

    #[test]
    fn test_remove() {
        let (dir, mut session) = session_with("[specs]\nfoo = ./x.yaml\nbar = ./y.yaml\n");
        assert!(remove(&mut session, "foo").unwrap().removed);
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap(),
            "[specs]\nbar = ./y.yaml\n"
        );

        let missing = remove(&mut session, "foo").unwrap();
        assert!(!missing.removed);
        assert_eq!(missing.to_human(), "No specification named foo");
    }

    #[test]
    fn test_remove_requires_init() {
        let (_dir, mut session) = fresh_session();
        assert!(matches!(
            remove(&mut session, "foo"),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_show() {
        let (_dir, session) = session_with("[specs]\nfoo = '../x.json'\n");
        let entry = show(&session, "foo").unwrap();
        assert_eq!(entry.kind, SourceKind::File);
        assert_eq!(entry.to_human(), "foo (FILE): ../x.json");
        assert!(matches!(show(&session, "bar"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_show_requires_init() {
        let (_dir, session) = fresh_session();
        assert!(matches!(show(&session, "foo"), Err(Error::NotInitialized)));
    }
}
