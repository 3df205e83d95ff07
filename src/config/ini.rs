//! Lossless INI document model.
//!
//! `apiscope.ini` is a file people edit by hand, so rewriting it must not
//! reorder or drop anything they wrote. [`IniDocument`] keeps every parsed
//! line's original text and only renders lines it created itself, which makes
//! `parse` followed by `to_string` byte-for-byte identical for an untouched
//! document (including `\r\n` line endings and a missing final newline).
//! Lines added to a document that uses `\r\n` are written with `\r\n` too.
//!
//! ## Dialect
//!
//! - `[name]` starts a section. Text after the closing `]` is ignored.
//! - `key = value` or `key: value` defines an entry; the first `=` or `:`
//!   splits key from value and both are trimmed.
//! - Full-line comments start with `#` or `;`. There are no inline comments.
//! - An indented, non-blank line directly after an entry continues its value.
//! - Entries before the first section header, duplicate sections, and
//!   duplicate keys within a section are errors.

use std::fmt;

/// Error produced when INI text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number of the offending line
    pub line: usize,
    /// What was wrong with it
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Blank line or comment, kept verbatim.
    Raw(String),
    Entry(Entry),
}

impl Item {
    fn is_blank(&self) -> bool {
        matches!(self, Item::Raw(line) if line.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: String,
    /// Original lines (first line plus continuations). `None` for entries
    /// created in memory, which are rendered as `key = value`.
    raw: Option<Vec<String>>,
}

impl Entry {
    /// `cr` is `"\r"` for `\r\n` documents and empty otherwise.
    fn render(&self, cr: &str, out: &mut Vec<String>) {
        match &self.raw {
            Some(lines) => out.extend(lines.iter().cloned()),
            None => {
                let value = self.value.replace('\n', &format!("{}\n    ", cr));
                out.push(format!("{} = {}{}", self.key, value, cr));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    header: String,
    items: Vec<Item>,
}

impl Section {
    fn entry_index(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Entry(entry) if entry.key == key))
    }
}

/// An INI file held in memory with enough detail to write it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    /// Blank and comment lines before the first section header
    preamble: Vec<String>,
    sections: Vec<Section>,
    trailing_newline: bool,
    /// Lines end in `\r\n`; new lines are written the same way
    crlf: bool,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IniDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            preamble: Vec::new(),
            sections: Vec::new(),
            trailing_newline: true,
            crlf: false,
        }
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, text.is_empty()),
        };

        let mut doc = Self {
            preamble: Vec::new(),
            sections: Vec::new(),
            trailing_newline,
            crlf: text.contains("\r\n"),
        };
        if text.is_empty() {
            return Ok(doc);
        }

        // Whether the previous line belonged to an entry that may continue.
        let mut in_value = false;

        for (idx, raw) in body.split('\n').enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || is_comment(trimmed) {
                doc.push_raw_line(raw);
                in_value = false;
                continue;
            }

            if in_value && raw.starts_with(char::is_whitespace) {
                if let Some(Item::Entry(entry)) =
                    doc.sections.last_mut().and_then(|s| s.items.last_mut())
                {
                    entry.value.push('\n');
                    entry.value.push_str(trimmed);
                    if let Some(lines) = entry.raw.as_mut() {
                        lines.push(raw.to_string());
                    }
                    continue;
                }
            }
            in_value = false;

            if let Some(rest) = trimmed.strip_prefix('[') {
                let Some(end) = rest.rfind(']') else {
                    return Err(ParseError::new(line_no, "unterminated section header"));
                };
                let name = &rest[..end];
                if name.is_empty() {
                    return Err(ParseError::new(line_no, "empty section name"));
                }
                if doc.has_section(name) {
                    return Err(ParseError::new(
                        line_no,
                        format!("section '{}' already exists", name),
                    ));
                }
                doc.sections.push(Section {
                    name: name.to_string(),
                    header: raw.to_string(),
                    items: Vec::new(),
                });
                continue;
            }

            let Some(section) = doc.sections.last_mut() else {
                return Err(ParseError::new(
                    line_no,
                    "entry appears before any section header",
                ));
            };
            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(ParseError::new(
                    line_no,
                    format!("expected `key = value`, found '{}'", trimmed),
                ));
            };
            let key = trimmed[..split].trim();
            let value = trimmed[split + 1..].trim();
            if key.is_empty() {
                return Err(ParseError::new(line_no, "entry has an empty key"));
            }
            if section.entry_index(key).is_some() {
                return Err(ParseError::new(
                    line_no,
                    format!("key '{}' already exists in section '{}'", key, section.name),
                ));
            }
            section.items.push(Item::Entry(Entry {
                key: key.to_string(),
                value: value.to_string(),
                raw: Some(vec![raw.to_string()]),
            }));
            in_value = true;
        }

        Ok(doc)
    }

    fn push_raw_line(&mut self, raw: &str) {
        match self.sections.last_mut() {
            Some(section) => section.items.push(Item::Raw(raw.to_string())),
            None => self.preamble.push(raw.to_string()),
        }
    }

    /// Whether the document contains no lines at all.
    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.sections.is_empty()
    }

    /// Check whether a section exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Append a new, empty section at the end of the document.
    ///
    /// Returns `false` if the section already exists.
    pub fn add_section(&mut self, name: &str) -> bool {
        if self.has_section(name) {
            return false;
        }

        let ends_blank = match self.sections.last() {
            Some(section) => section.items.last().is_none_or(Item::is_blank),
            None => self.preamble.last().is_none_or(|l| l.trim().is_empty()),
        };
        if !self.is_empty() && !ends_blank {
            let blank = self.cr().to_string();
            self.push_raw_line(&blank);
        }

        let header = format!("[{}]{}", name, self.cr());
        self.sections.push(Section {
            name: name.to_string(),
            header,
            items: Vec::new(),
        });
        true
    }

    /// Append a comment line to a section. Empty text produces a bare `#`.
    ///
    /// Returns `false` if the section does not exist.
    pub fn push_comment(&mut self, section: &str, text: &str) -> bool {
        let cr = self.cr();
        let Some(section) = self.section_mut(section) else {
            return false;
        };
        let line = if text.is_empty() {
            format!("#{}", cr)
        } else {
            format!("# {}{}", text, cr)
        };
        section.items.push(Item::Raw(line));
        true
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let section = self.section(section)?;
        section.items.iter().find_map(|item| match item {
            Item::Entry(entry) if entry.key == key => Some(entry.value.as_str()),
            _ => None,
        })
    }

    /// Entries of a section in file order. Empty if the section is absent.
    pub fn entries<'a>(
        &'a self,
        section: &str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        self.section(section)
            .into_iter()
            .flat_map(|s| s.items.iter())
            .filter_map(|item| match item {
                Item::Entry(entry) => Some((entry.key.as_str(), entry.value.as_str())),
                Item::Raw(_) => None,
            })
    }

    /// Insert an entry after the last non-blank line of a section, creating
    /// the section if needed.
    ///
    /// Returns `false` (and changes nothing) if the key already exists.
    pub fn insert(&mut self, section: &str, key: &str, value: &str) -> bool {
        self.add_section(section);
        let Some(section) = self.section_mut(section) else {
            return false;
        };
        if section.entry_index(key).is_some() {
            return false;
        }

        let at = section
            .items
            .iter()
            .rposition(|item| !item.is_blank())
            .map_or(0, |idx| idx + 1);
        section.items.insert(
            at,
            Item::Entry(Entry {
                key: key.to_string(),
                value: value.to_string(),
                raw: None,
            }),
        );
        true
    }

    /// Remove an entry and all its lines.
    ///
    /// Returns `false` if the section or key does not exist.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let Some(section) = self.section_mut(section) else {
            return false;
        };
        match section.entry_index(key) {
            Some(idx) => {
                section.items.remove(idx);
                true
            }
            None => false,
        }
    }

    fn cr(&self) -> &'static str {
        if self.crlf { "\r" } else { "" }
    }

    fn lines(&self) -> Vec<String> {
        let cr = self.cr();
        let mut out = self.preamble.clone();
        for section in &self.sections {
            out.push(section.header.clone());
            for item in &section.items {
                match item {
                    Item::Raw(line) => out.push(line.clone()),
                    Item::Entry(entry) => entry.render(cr, &mut out),
                }
            }
        }
        out
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines();
        f.write_str(&lines.join("\n"))?;
        if self.trailing_newline && !lines.is_empty() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with(';')
}
