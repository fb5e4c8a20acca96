use std::fmt;
use std::path::{Path, PathBuf};

use crate::comic_sort::format::{format_issue, format_volume, title_key};
use crate::comic_sort::parse::parse_filename;

/// Classification of a parsed comic filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComicKind {
    /// A single numbered installment, including annuals.
    Issue,
    /// A collected edition numbered separately from issues.
    Volume,
    /// A one-shot or special without issue or volume numbering.
    Standalone,
    /// Nothing usable could be extracted from the filename.
    Unparseable,
}

/// Value used to test whether two files with the same title key are the same comic.
///
/// Year and file extension are never part of the identity of issues and volumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    Issue(u32),
    Annual { year: u16, issue: u32 },
    Volume(u32),
    /// Lowercase normalized display name without extension.
    Standalone(String),
}

/// Structured result of parsing one comic filename.
///
/// Created once per file and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    raw_name: String,
    title: String,
    kind: ComicKind,
    issue_number: Option<u32>,
    volume_number: Option<u32>,
    year: Option<u16>,
    annual_year: Option<u16>,
    edition: Option<String>,
    extension: String,
}

/// Fields extracted by a single pattern attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedFields {
    pub(crate) title: String,
    pub(crate) issue_number: Option<u32>,
    pub(crate) volume_number: Option<u32>,
    pub(crate) year: Option<u16>,
    pub(crate) annual_year: Option<u16>,
    pub(crate) edition: Option<String>,
}

/// A comic file found under the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicEntry {
    /// Path relative to the input directory.
    source: PathBuf,
    parsed: ParsedFilename,
}

/// Counts and lists accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub renamed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duplicates: usize,
    /// Entries formatted as `<original filename> → <normalized filename>`.
    pub duplicate_list: Vec<String>,
    pub error_list: Vec<String>,
}

impl ParsedFilename {
    pub(crate) fn unparseable(raw_name: &str, extension: &str) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            title: String::new(),
            kind: ComicKind::Unparseable,
            issue_number: None,
            volume_number: None,
            year: None,
            annual_year: None,
            edition: None,
            extension: extension.to_string(),
        }
    }

    pub(crate) fn from_fields(raw_name: &str, extension: &str, kind: ComicKind, fields: ParsedFields) -> Self {
        debug_assert!(kind != ComicKind::Issue || fields.issue_number.is_some());
        debug_assert!(kind != ComicKind::Volume || fields.volume_number.is_some());
        Self {
            raw_name: raw_name.to_string(),
            title: fields.title,
            kind,
            issue_number: fields.issue_number,
            volume_number: fields.volume_number,
            year: fields.year,
            annual_year: fields.annual_year,
            edition: fields.edition,
            extension: extension.to_string(),
        }
    }

    /// Original filename including extension.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Title in its source casing. Empty for unparseable files.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn kind(&self) -> ComicKind {
        self.kind
    }

    #[must_use]
    pub const fn issue_number(&self) -> Option<u32> {
        self.issue_number
    }

    #[must_use]
    pub const fn volume_number(&self) -> Option<u32> {
        self.volume_number
    }

    #[must_use]
    pub const fn year(&self) -> Option<u16> {
        self.year
    }

    /// Year printed in an annual title, as in `Absolute Batman 2025 Annual #001`.
    #[must_use]
    pub const fn annual_year(&self) -> Option<u16> {
        self.annual_year
    }

    /// Edition parenthetical of a yearless standalone, as in `Saga (Deluxe Edition)`.
    #[must_use]
    pub fn edition(&self) -> Option<&str> {
        self.edition.as_deref()
    }

    /// File extension without the leading dot, in its original casing.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.kind != ComicKind::Unparseable
    }

    /// Case-folded title used for grouping and duplicate matching.
    #[must_use]
    pub fn title_key(&self) -> String {
        title_key(&self.title)
    }

    /// Normalized filename without extension using the given display title.
    ///
    /// Returns `None` for unparseable files.
    #[must_use]
    pub fn normalized_stem(&self, display_title: &str) -> Option<String> {
        let mut parts = vec![display_title.to_string()];
        match self.kind {
            ComicKind::Issue => {
                if let Some(annual_year) = self.annual_year {
                    parts.push(format!("{annual_year:04} Annual"));
                }
                parts.push(format_issue(self.issue_number?));
            }
            ComicKind::Volume => parts.push(format_volume(self.volume_number?)),
            ComicKind::Standalone => {
                if let Some(edition) = &self.edition {
                    parts.push(format!("({edition})"));
                }
            }
            ComicKind::Unparseable => return None,
        }
        if let Some(year) = self.year {
            parts.push(format!("({year:04})"));
        }
        Some(parts.join(" "))
    }

    /// Normalized filename with the original extension.
    #[must_use]
    pub fn normalized_name(&self, display_title: &str) -> Option<String> {
        self.normalized_stem(display_title)
            .map(|stem| format!("{stem}.{}", self.extension))
    }

    /// Identity used for duplicate matching. `None` for unparseable files.
    #[must_use]
    pub fn identity(&self) -> Option<IdentityKey> {
        match self.kind {
            ComicKind::Issue => {
                let issue = self.issue_number?;
                Some(
                    self.annual_year
                        .map_or(IdentityKey::Issue(issue), |year| IdentityKey::Annual { year, issue }),
                )
            }
            ComicKind::Volume => self.volume_number.map(IdentityKey::Volume),
            ComicKind::Standalone => self
                .normalized_stem(&self.title)
                .map(|stem| IdentityKey::Standalone(stem.to_lowercase())),
            ComicKind::Unparseable => None,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue(issue) => write!(f, "{}", format_issue(*issue)),
            Self::Annual { year, issue } => write!(f, "{year} Annual {}", format_issue(*issue)),
            Self::Volume(volume) => write!(f, "{}", format_volume(*volume)),
            Self::Standalone(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for ComicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issue => "issue",
            Self::Volume => "volume",
            Self::Standalone => "standalone",
            Self::Unparseable => "unparseable",
        };
        write!(f, "{name}")
    }
}

impl ComicEntry {
    /// Parse the filename of the given path relative to the input directory.
    #[must_use]
    pub fn new(source: PathBuf) -> Self {
        let file_name = crate::path_to_filename_string(&source);
        let parsed = parse_filename(&file_name);
        Self { source, parsed }
    }

    /// Create an entry for a file directly in the input directory.
    #[must_use]
    pub fn from_name(file_name: &str) -> Self {
        Self::new(PathBuf::from(file_name))
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub const fn parsed(&self) -> &ParsedFilename {
        &self.parsed
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        self.parsed.raw_name()
    }
}

impl RunResult {
    pub(crate) const fn record_renamed(&mut self) {
        self.renamed += 1;
    }

    pub(crate) const fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn record_error(&mut self, description: String) {
        self.errors += 1;
        self.error_list.push(description);
    }

    pub(crate) fn record_duplicate(&mut self, original: &str, normalized: &str) {
        self.duplicates += 1;
        self.duplicate_list.push(format!("{original} → {normalized}"));
    }

    /// Number of processed files.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.renamed + self.skipped + self.errors
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Renamed: {}  Skipped: {}  Moved to error: {}  Possible duplicates: {}",
            self.renamed, self.skipped, self.errors, self.duplicates
        )
    }
}
