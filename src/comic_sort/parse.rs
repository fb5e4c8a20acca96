//! Filename parser.
//!
//! Each pattern attempt is a pure function from the filename stem to optional fields.
//! Attempts run in a fixed order and the first match wins,
//! since the patterns overlap: an annual also looks like an issue,
//! and `Title Vol 2` also looks like a bare issue number.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::comic_sort::format::clean_title;
use crate::comic_sort::types::{ComicKind, ParsedFields, ParsedFilename};

/// Accepted archive extensions, compared case-insensitively.
pub const COMIC_EXTENSIONS: &[&str] = &["cbz", "cbr"];

/// Title, title year, `Annual`, issue number and optional year: `Title 2025 Annual #001 (2025)`.
static RE_ANNUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)\s+(?P<annual_year>\d{4})\s+annual\s*#?(?P<issue>\d{1,4})\b\s*(?:\(of\s*\d+\s*\)\s*)?(?:\((?P<year>\d{4})\))?",
    )
    .expect("Failed to compile annual regex")
});

/// `#` issue token: `#1`, `#0001`.
static RE_ISSUE_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(?P<issue>\d+)\b").expect("Failed to compile hash issue regex"));

/// Bare issue token after whitespace: ` 001`.
static RE_ISSUE_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(?P<issue>\d{1,4})\b").expect("Failed to compile bare issue regex"));

/// Optional run length and year following an issue token: ` (of 4) (2019)`.
static RE_ISSUE_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\(of\s*\d+\s*\)\s*)?(?:\((?P<year>\d{4})\))?").expect("Failed to compile issue tail regex")
});

/// Title and volume token: `Title v02 (2012)`, `Title Vol. 2`, `Title Vol2`.
///
/// The number must be followed by a parenthetical, `#` or the end of the name,
/// so `The v2 Story` stays a title.
static RE_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)\s+(?:v|vol(?:ume)?\.?\s*)(?P<volume>\d{1,4})\s*(?:\((?P<year>\d{4})\)|\(|#|$)",
    )
    .expect("Failed to compile volume regex")
});

/// Title followed by a year in parentheses. Anything after the year is rip info.
static RE_STANDALONE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?)\s*\((?P<year>\d{4})\)").expect("Failed to compile standalone year regex")
});

/// Title with at most one trailing parenthetical.
static RE_STANDALONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>[^()]+?)(?:\s*\((?P<edition>[^()]+)\))?\s*$")
        .expect("Failed to compile standalone regex")
});

/// Title ending in a volume marker whose number was mistaken for an issue.
static RE_VOLUME_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)vol(?:ume)?\.?$").expect("Failed to compile volume suffix regex"));

type PatternAttempt = fn(&str) -> Option<(ComicKind, ParsedFields)>;

const PATTERN_ATTEMPTS: [PatternAttempt; 5] = [
    parse_annual,
    parse_issue,
    parse_volume,
    parse_standalone_with_year,
    parse_standalone,
];

/// Parse a comic archive filename.
///
/// Never fails: anything that is not a `.cbz`/`.cbr` file with a usable title
/// comes back as [`ComicKind::Unparseable`].
///
/// ```rust
/// use comic_sorter::comic_sort::{ComicKind, parse_filename};
///
/// let parsed = parse_filename("Batman 002 (of 12) (2025).cbr");
/// assert_eq!(parsed.kind(), ComicKind::Issue);
/// assert_eq!(parsed.title(), "Batman");
/// assert_eq!(parsed.issue_number(), Some(2));
/// assert_eq!(parsed.year(), Some(2025));
/// ```
#[must_use]
pub fn parse_filename(filename: &str) -> ParsedFilename {
    let (stem, extension) = split_extension(filename);
    if !is_comic_extension(extension) {
        return ParsedFilename::unparseable(filename, extension);
    }

    let stem: String = stem.nfc().collect();
    PATTERN_ATTEMPTS
        .iter()
        .find_map(|attempt| attempt(&stem))
        .map_or_else(
            || ParsedFilename::unparseable(filename, extension),
            |(kind, fields)| ParsedFilename::from_fields(filename, extension, kind, fields),
        )
}

/// Check if the extension (without dot) is a comic archive extension.
#[must_use]
pub fn is_comic_extension(extension: &str) -> bool {
    COMIC_EXTENSIONS
        .iter()
        .any(|comic_extension| extension.eq_ignore_ascii_case(comic_extension))
}

/// Split filename into stem and extension without the dot.
fn split_extension(filename: &str) -> (&str, &str) {
    filename
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .unwrap_or((filename, ""))
}

fn parse_annual(stem: &str) -> Option<(ComicKind, ParsedFields)> {
    let captures = RE_ANNUAL.captures(stem)?;
    let title = usable_title(&captures["title"])?;
    let fields = ParsedFields {
        title,
        issue_number: Some(captures["issue"].parse().ok()?),
        year: capture_year(&captures, "year"),
        annual_year: capture_year(&captures, "annual_year"),
        ..ParsedFields::default()
    };
    Some((ComicKind::Issue, fields))
}

/// A `#` token takes priority over an earlier bare number that belongs to the title.
fn parse_issue(stem: &str) -> Option<(ComicKind, ParsedFields)> {
    first_issue(stem, &RE_ISSUE_HASH, false)
        .or_else(|| first_issue(stem, &RE_ISSUE_BARE, true))
        .map(|fields| (ComicKind::Issue, fields))
}

/// Try issue tokens from left to right and take the first one that leaves a valid title.
fn first_issue(stem: &str, token: &Regex, bare: bool) -> Option<ParsedFields> {
    token.captures_iter(stem).find_map(|captures| {
        let token_match = captures.get(0)?;
        let issue = captures.name("issue")?.as_str();
        issue_fields(
            &stem[..token_match.start()],
            issue,
            &stem[token_match.end()..],
            bare,
        )
    })
}

fn issue_fields(raw_title: &str, issue_str: &str, rest: &str, bare: bool) -> Option<ParsedFields> {
    // `Title Vol 3 005`: the number after a volume marker is the volume, not the issue
    if RE_VOLUME_SUFFIX.is_match(raw_title.trim_end()) {
        return None;
    }

    let issue: u32 = issue_str.parse().ok()?;
    let year = RE_ISSUE_TAIL
        .captures(rest)
        .and_then(|captures| capture_year(&captures, "year"));

    // `Title 2020 (2020)`: a bare year-like number followed by a year belongs to the title
    if bare && year.is_some() && issue_str.len() == 4 && (1900..=2099).contains(&issue) {
        return None;
    }

    Some(ParsedFields {
        title: usable_title(raw_title)?,
        issue_number: Some(issue),
        year,
        ..ParsedFields::default()
    })
}

fn parse_volume(stem: &str) -> Option<(ComicKind, ParsedFields)> {
    let captures = RE_VOLUME.captures(stem)?;
    let fields = ParsedFields {
        title: usable_title(&captures["title"])?,
        volume_number: Some(captures["volume"].parse().ok()?),
        year: capture_year(&captures, "year"),
        ..ParsedFields::default()
    };
    Some((ComicKind::Volume, fields))
}

fn parse_standalone_with_year(stem: &str) -> Option<(ComicKind, ParsedFields)> {
    let captures = RE_STANDALONE_YEAR.captures(stem)?;
    let fields = ParsedFields {
        title: usable_title(&captures["title"])?,
        year: capture_year(&captures, "year"),
        ..ParsedFields::default()
    };
    Some((ComicKind::Standalone, fields))
}

/// Yearless standalone.
///
/// A single bare word carries no structure that separates a title from junk,
/// so it needs either more words or an edition parenthetical.
fn parse_standalone(stem: &str) -> Option<(ComicKind, ParsedFields)> {
    let captures = RE_STANDALONE.captures(stem)?;
    let title = usable_title(&captures["title"])?;
    let edition = captures
        .name("edition")
        .map(|edition| clean_title(edition.as_str()))
        .filter(|edition| !edition.is_empty());

    if edition.is_none() && title.split_whitespace().count() < 2 {
        return None;
    }

    let fields = ParsedFields {
        title,
        edition,
        ..ParsedFields::default()
    };
    Some((ComicKind::Standalone, fields))
}

fn capture_year(captures: &Captures, name: &str) -> Option<u16> {
    captures.name(name).and_then(|year| year.as_str().parse().ok())
}

fn usable_title(raw_title: &str) -> Option<String> {
    let title = clean_title(raw_title);
    title.chars().any(char::is_alphabetic).then_some(title)
}
