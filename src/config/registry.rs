//! The named-source registry stored in the `[specs]` section of `apiscope.ini`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use super::ini::IniDocument;
use crate::{Error, Result};

/// Name of the INI section holding registry entries.
pub const SECTION_NAME: &str = "specs";

/// File mode for a newly created `apiscope.ini` (rw-r--r--).
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o644;

/// Guidance written under `[specs]` when a project is first initialized.
const TEMPLATE_COMMENTS: &[&str] = &[
    "Example API specifications",
    "Format: <name> = <source>",
    "",
    "Sources can be:",
    "- Local file: ./api/openapi.yaml",
    "- Remote URL: https://api.example.com/openapi.json",
    "",
    "Uncomment and modify the lines below:",
    "stripe = https://raw.githubusercontent.com/stripe/openapi/master/openapi/spec3.yaml",
    "github = https://github.com/github/rest-api-description/raw/main/descriptions/api.github.com/api.github.com.json",
    "petstore = https://petstore3.swagger.io/api/v3/openapi.json",
];

/// How a source string is interpreted when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    /// `http://` or `https://` URL
    Url,
    /// Path starting with `./` or `../`
    File,
    /// Anything else
    Invalid,
}

impl SourceKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Url => "URL",
            SourceKind::File => "FILE",
            SourceKind::Invalid => "INVALID",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strip surrounding whitespace, then surrounding quote characters.
pub fn clean_source(source: &str) -> &str {
    source.trim().trim_matches(|c: char| c == '"' || c == '\'')
}

/// Classify a raw source string. Classification never rejects a source; an
/// `Invalid` kind is only a hint for display.
pub fn classify_source(source: &str) -> SourceKind {
    let cleaned = clean_source(source);
    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        SourceKind::Url
    } else if cleaned.starts_with("./") || cleaned.starts_with("../") {
        SourceKind::File
    } else {
        SourceKind::Invalid
    }
}

/// A registry entry together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecEntry {
    pub name: String,
    /// Source exactly as stored in the file
    pub source: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

impl SpecEntry {
    /// Create an entry, classifying its source.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            name: name.into(),
            kind: classify_source(&source),
            source,
        }
    }

    /// The source with quotes and padding removed.
    pub fn cleaned_source(&self) -> &str {
        clean_source(&self.source)
    }
}

/// Mapping from spec name to source, backed by a lossless INI document.
///
/// Only the `[specs]` section is managed; every other line of the file is
/// carried through `load`/`save` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    document: IniDocument,
}

impl Registry {
    /// Create an empty, uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An initialized registry containing the commented example template.
    pub fn template() -> Self {
        let mut document = IniDocument::new();
        document.add_section(SECTION_NAME);
        for line in TEMPLATE_COMMENTS {
            document.push_comment(SECTION_NAME, line);
        }
        Self { document }
    }

    /// Parse registry content from INI text.
    pub fn parse(text: &str) -> std::result::Result<Self, super::ini::ParseError> {
        Ok(Self {
            document: IniDocument::parse(text)?,
        })
    }

    /// Load the registry from `path`.
    ///
    /// A missing file yields an empty, uninitialized registry. A file that
    /// exists but cannot be read is a persistence error; content that is not
    /// UTF-8 INI text is a parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file; starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(Error::Persistence {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            Error::Parse {
                path: path.to_path_buf(),
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                message: "file is not valid UTF-8".to_string(),
            }
        })?;

        let registry = Self::parse(&text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;
        tracing::debug!(
            path = %path.display(),
            initialized = registry.is_initialized(),
            "loaded configuration"
        );
        Ok(registry)
    }

    /// Write the whole document to `path`, replacing it atomically.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so readers never see a partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let persistence = |source: io::Error| Error::Persistence {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Keep the permissions of the file being replaced.
        let permissions = match fs::metadata(path) {
            Ok(meta) => Some(meta.permissions()),
            Err(_) => default_permissions(),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(persistence)?;
        tmp.write_all(self.document.to_string().as_bytes())
            .map_err(persistence)?;
        tmp.as_file().sync_all().map_err(persistence)?;
        if let Some(permissions) = permissions {
            fs::set_permissions(tmp.path(), permissions).map_err(persistence)?;
        }
        tmp.persist(path).map_err(|e| persistence(e.error))?;

        tracing::debug!(path = %path.display(), entries = self.len(), "saved configuration");
        Ok(())
    }

    /// Whether the `[specs]` section exists.
    pub fn is_initialized(&self) -> bool {
        self.document.has_section(SECTION_NAME)
    }

    /// Whether the backing document has no content at all.
    pub fn is_blank(&self) -> bool {
        self.document.is_empty()
    }

    /// Create the `[specs]` section. Returns `true` if it was created.
    pub fn initialize(&mut self) -> bool {
        let created = self.document.add_section(SECTION_NAME);
        if created {
            tracing::debug!(section = SECTION_NAME, "created registry section");
        }
        created
    }

    /// Look up the source for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.document.get(SECTION_NAME, name)
    }

    /// All `(name, source)` pairs in file order.
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.document.entries(SECTION_NAME).collect()
    }

    /// All entries with their source classification, in file order.
    pub fn specifications(&self) -> Vec<SpecEntry> {
        self.document
            .entries(SECTION_NAME)
            .map(|(name, source)| SpecEntry::new(name, source))
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.document.entries(SECTION_NAME).count()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add an entry at the end of the section.
    ///
    /// An uninitialized registry gets its section created first.
    pub fn add(&mut self, name: &str, source: &str) -> Result<()> {
        validate_name(name)?;
        validate_source(source)?;
        if self.get(name).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }

        self.initialize();
        self.document.insert(SECTION_NAME, name, source);
        Ok(())
    }

    /// Remove an entry. Returns `false` if there was nothing to remove.
    pub fn remove(&mut self, name: &str) -> bool {
        self.document.remove(SECTION_NAME, name)
    }

    /// The registry rendered as INI text.
    pub fn render(&self) -> String {
        self.document.to_string()
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(CONFIG_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Names must survive a write/read cycle of the INI file unchanged.
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("spec name cannot be empty".to_string()));
    }
    if name.trim() != name {
        return Err(Error::InvalidInput(format!(
            "spec name '{}' has leading or trailing whitespace",
            name
        )));
    }
    if name.contains(['=', ':', '\n', '\r']) {
        return Err(Error::InvalidInput(format!(
            "spec name '{}' cannot contain '=', ':' or line breaks",
            name
        )));
    }
    if name.starts_with(['[', '#', ';']) {
        return Err(Error::InvalidInput(format!(
            "spec name '{}' cannot start with '[', '#' or ';'",
            name
        )));
    }
    Ok(())
}

fn validate_source(source: &str) -> Result<()> {
    if source.contains(['\n', '\r']) {
        return Err(Error::InvalidInput(
            "source cannot contain line breaks".to_string(),
        ));
    }
    if source.trim() != source {
        return Err(Error::InvalidInput(format!(
            "source '{}' has leading or trailing whitespace",
            source
        )));
    }
    Ok(())
}
