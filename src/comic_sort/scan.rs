use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::comic_sort::organize::{DUPLICATES_DIR_NAME, ERROR_DIR_NAME};
use crate::comic_sort::parse::is_comic_extension;
use crate::comic_sort::types::ComicEntry;
use crate::{is_hidden, print_warning};

/// Collect comic archives from the input directory.
///
/// Only the top level is read unless `recurse` is set.
/// Hidden entries and the `error` and `possibleDuplicates` folders are never entered.
/// Returned sources are relative to `root` and sorted.
///
/// # Errors
/// Returns an error if the root directory cannot be read.
pub fn collect_comic_files(root: &Path, recurse: bool) -> Result<Vec<ComicEntry>> {
    let max_depth = if recurse { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !is_hidden(entry)
                && !(entry.depth() == 1
                    && entry.file_type().is_dir()
                    && (entry.file_name() == ERROR_DIR_NAME || entry.file_name() == DUPLICATES_DIR_NAME))
        });

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) if error.depth() == 0 => {
                return Err(error).with_context(|| format!("Failed to read input directory {}", root.display()));
            }
            Err(error) => {
                print_warning!("Skipping unreadable path: {error}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let has_comic_extension = entry
            .path()
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(is_comic_extension);
        if !has_comic_extension {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            entries.push(ComicEntry::new(relative.to_path_buf()));
        }
    }

    entries.sort_by(|a, b| a.source().cmp(b.source()));
    Ok(entries)
}
