//! Configuration state for apiscope.
//!
//! A project keeps three artifacts at its root:
//!
//! - `apiscope.ini` - the registry of named API specification sources, in the
//!   `[specs]` section. Other sections and comments are preserved on save.
//! - `.apiscope/` - cache directory reserved for fetched specifications.
//! - `.gitignore` - gets a `.apiscope/` rule on `apiscope init`.
//!
//! ## Layout
//!
//! - [`root`] finds the project root from a starting directory
//! - [`ini`] is the lossless INI document model
//! - [`registry`] owns the `[specs]` mapping and its load/save
//! - [`gitignore`] adds the cache rule to `.gitignore`
//! - [`session`] ties these together for a single CLI invocation

pub mod gitignore;
pub mod ini;
pub mod registry;
pub mod root;
pub mod session;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE_NAME: &str = "apiscope.ini";

/// Name of the cache directory at the project root.
pub const CACHE_DIR_NAME: &str = ".apiscope";

pub use gitignore::{GitignoreUpdate, IGNORE_LINE, ensure_gitignore};
pub use ini::{IniDocument, ParseError};
#[cfg(unix)]
pub use registry::CONFIG_FILE_MODE;
pub use registry::{
    Registry, SECTION_NAME, SourceKind, SpecEntry, classify_source, clean_source,
};
pub use root::{absolute_root, find_project_root, find_project_root_from_cwd};
pub use session::{ConfigSession, InitReport};
