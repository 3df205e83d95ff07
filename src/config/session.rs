//! The per-invocation configuration session every command works through.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::gitignore::{GitignoreUpdate, ensure_gitignore};
use super::registry::Registry;
use super::root::{absolute_root, find_project_root, find_project_root_from_cwd};
use super::{CACHE_DIR_NAME, CONFIG_FILE_NAME};
use crate::{Error, Result};

/// Outcome of [`ConfigSession::ensure_initialized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    /// The `[specs]` section existed before this call
    pub already_initialized: bool,
    /// The example template was written because there was no prior content
    pub template_written: bool,
    pub cache_dir: PathBuf,
    /// What happened to `.gitignore`, if updating it succeeded
    pub gitignore: Option<GitignoreUpdate>,
    /// Why updating `.gitignore` failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitignore_warning: Option<String>,
}

/// Configuration state for one invocation: project root, config path and the
/// loaded registry.
///
/// A session is `Uninitialized` until the `[specs]` section exists, which
/// happens on [`ensure_initialized`](Self::ensure_initialized) or implicitly
/// when an entry is added.
#[derive(Debug, Clone)]
pub struct ConfigSession {
    project_root: PathBuf,
    config_path: PathBuf,
    registry: Registry,
}

impl ConfigSession {
    /// Open the session for the current directory.
    ///
    /// With `root_override` the given directory is used as the project root
    /// without discovery (made absolute first); otherwise the root is
    /// discovered from the current working directory. A missing config file
    /// is not an error.
    pub fn open(root_override: Option<&Path>) -> Result<Self> {
        let project_root = match root_override {
            Some(root) => absolute_root(root)?,
            None => find_project_root_from_cwd()?,
        };
        Self::at_root(project_root)
    }

    /// Open the session, discovering the project root from `start`.
    pub fn open_from(start: &Path) -> Result<Self> {
        Self::at_root(find_project_root(start))
    }

    fn at_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        let registry = Registry::load(&config_path)?;
        tracing::debug!(
            root = %project_root.display(),
            initialized = registry.is_initialized(),
            "opened configuration session"
        );
        Ok(Self {
            project_root,
            config_path,
            registry,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the `[specs]` section exists.
    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The registry, or [`Error::NotInitialized`] if the section is absent.
    pub fn require_initialized(&self) -> Result<&Registry> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        Ok(&self.registry)
    }

    /// Mutable variant of [`require_initialized`](Self::require_initialized).
    pub fn require_initialized_mut(&mut self) -> Result<&mut Registry> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        Ok(&mut self.registry)
    }

    /// Path of the cache directory, created if missing.
    pub fn cache_directory(&self) -> Result<PathBuf> {
        let dir = self.project_root.join(CACHE_DIR_NAME);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Persist the registry to the config file.
    pub fn save(&self) -> Result<()> {
        self.registry.save(&self.config_path)
    }

    /// Bring the project into the initialized state. Safe to repeat.
    ///
    /// Creates the `[specs]` section (writing the example template when the
    /// config file has no content yet), the cache directory and the
    /// `.gitignore` rule, then saves. A `.gitignore` failure is logged and
    /// reported but does not fail initialization.
    pub fn ensure_initialized(&mut self) -> Result<InitReport> {
        let already_initialized = self.is_initialized();

        let template_written = self.registry.is_blank();
        if template_written {
            self.registry = Registry::template();
        } else {
            self.registry.initialize();
        }

        let cache_dir = self.cache_directory()?;

        let (gitignore, gitignore_warning) = match ensure_gitignore(&self.project_root) {
            Ok(update) => (Some(update), None),
            Err(e) => {
                tracing::warn!(
                    root = %self.project_root.display(),
                    error = %e,
                    "could not update .gitignore"
                );
                (None, Some(e.to_string()))
            }
        };

        self.save()?;

        Ok(InitReport {
            project_root: self.project_root.clone(),
            config_path: self.config_path.clone(),
            already_initialized,
            template_written,
            cache_dir,
            gitignore,
            gitignore_warning,
        })
    }
}
