use std::sync::LazyLock;

use regex::Regex;

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Separator characters left dangling at title ends after stripping issue, volume or year tokens.
const DANGLING_SEPARATORS: &[char] = &['-', '–', '—', '(', '[', '_', ',', ':', ';', '~'];

/// Format issue number with three digit zero padding, or natural width above 999.
///
/// ```rust
/// use comic_sorter::comic_sort::format_issue;
///
/// assert_eq!(format_issue(1), "#001");
/// assert_eq!(format_issue(1000), "#1000");
/// ```
#[must_use]
pub fn format_issue(issue: u32) -> String {
    if issue <= 999 {
        format!("#{issue:03}")
    } else {
        format!("#{issue}")
    }
}

/// Format volume number without padding.
#[must_use]
pub fn format_volume(volume: u32) -> String {
    format!("Vol. {volume}")
}

/// Capitalize each whitespace separated word: first character upper case, rest lower case.
///
/// ```rust
/// use comic_sorter::comic_sort::capitalize_title;
///
/// assert_eq!(capitalize_title("batman - dark victory"), "Batman - Dark Victory");
/// assert_eq!(capitalize_title("X-MEN"), "X-men");
/// ```
#[must_use]
pub fn capitalize_title(title: &str) -> String {
    title.split_whitespace().map(capitalize_word).collect::<Vec<_>>().join(" ")
}

/// Case-folded title with collapsed whitespace.
#[must_use]
pub fn title_key(title: &str) -> String {
    collapse_whitespace(title).to_lowercase()
}

/// Trim whitespace and dangling separators left by stripped tokens and collapse internal whitespace.
///
/// ```rust
/// use comic_sorter::comic_sort::clean_title;
///
/// assert_eq!(clean_title("  Batman   -  "), "Batman");
/// assert_eq!(clean_title("Saga ("), "Saga");
/// ```
#[must_use]
pub fn clean_title(raw_title: &str) -> String {
    let collapsed = collapse_whitespace(raw_title);
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || DANGLING_SEPARATORS.contains(&c))
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// A first letter without a single-character upper case form, like `ß`, is kept as is.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        let upper = first.to_uppercase();
        let mut capitalized = if upper.len() == 1 {
            upper.collect::<String>()
        } else {
            first.to_string()
        };
        capitalized.extend(chars.flat_map(char::to_lowercase));
        capitalized
    })
}
