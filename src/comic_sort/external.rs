use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::comic_sort::format::title_key;
use crate::comic_sort::parse::parse_filename;
use crate::comic_sort::types::IdentityKey;
use crate::{is_hidden, path_to_filename_string, print_warning};

/// Comics already present in the external collection, keyed by title folder.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExternalIndex {
    root: Option<PathBuf>,
    titles: HashMap<String, HashSet<IdentityKey>>,
}

impl ExternalIndex {
    /// Scan `<root>/<Title>/<file>` entries of the external collection.
    ///
    /// Title keys come from the folder names, identities from parsing the filenames inside.
    /// Files directly under the root and unparseable files are ignored.
    /// Unreadable title folders are skipped with a warning.
    ///
    /// # Errors
    /// Returns an error if the root is not a readable directory.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("External directory does not exist: {}", root.display());
        }

        let mut index = Self {
            root: Some(root.to_path_buf()),
            titles: HashMap::new(),
        };

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) if error.depth() == 0 => {
                    return Err(error)
                        .with_context(|| format!("Failed to read external directory {}", root.display()));
                }
                Err(error) => {
                    print_warning!("Skipping unreadable path in external directory: {error}");
                    continue;
                }
            };
            if entry.depth() != 2 || !entry.file_type().is_file() {
                continue;
            }
            let Some(folder) = entry.path().parent() else {
                continue;
            };
            index.insert(
                &path_to_filename_string(folder),
                &path_to_filename_string(entry.path()),
            );
        }

        Ok(index)
    }

    /// Build an index from `(title folder, filename)` pairs.
    ///
    /// ```rust
    /// use comic_sorter::comic_sort::{ExternalIndex, IdentityKey};
    ///
    /// let index = ExternalIndex::from_names([("Batman", "Batman #001 (2024).cbr")]);
    /// assert!(index.contains("batman", &IdentityKey::Issue(1)));
    /// ```
    #[must_use]
    pub fn from_names<'a>(names: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::default();
        for (folder, file_name) in names {
            index.insert(folder, file_name);
        }
        index
    }

    fn insert(&mut self, folder: &str, file_name: &str) {
        if let Some(identity) = parse_filename(file_name).identity() {
            self.titles.entry(title_key(folder)).or_default().insert(identity);
        }
    }

    /// Check whether the identity exists under the given case-folded title key.
    #[must_use]
    pub fn contains(&self, title_key: &str, identity: &IdentityKey) -> bool {
        self.titles
            .get(title_key)
            .is_some_and(|identities| identities.contains(identity))
    }

    /// Scanned directory, `None` for indexes built from names.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Number of title folders with at least one recognized comic.
    #[must_use]
    pub fn title_count(&self) -> usize {
        self.titles.len()
    }

    /// Number of indexed comics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.values().map(HashSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod external_tests {
    use super::*;

    use std::fs::{self, File};

    use tempfile::tempdir;

    #[test]
    fn scan_indexes_title_folders() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir(root.join("Batman")).expect("create dir");
        File::create(root.join("Batman").join("Batman #001 (2024).cbr")).expect("create file");
        File::create(root.join("Batman").join("Batman Vol. 3 (2017).cbz")).expect("create file");
        fs::create_dir(root.join("Watchmen")).expect("create dir");
        File::create(root.join("Watchmen").join("notes.txt")).expect("create file");

        let index = ExternalIndex::scan(root).expect("scan");
        assert_eq!(index.root(), Some(root));
        assert_eq!(index.len(), 2);
        assert_eq!(index.title_count(), 1);
        assert!(index.contains("batman", &IdentityKey::Issue(1)));
        assert!(index.contains("batman", &IdentityKey::Volume(3)));
        assert!(!index.contains("batman", &IdentityKey::Issue(3)));
        assert!(!index.contains("watchmen", &IdentityKey::Issue(1)));
    }

    #[test]
    fn scan_ignores_root_files_and_hidden_folders() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        File::create(root.join("Saga #001 (2012).cbz")).expect("create file");
        fs::create_dir(root.join(".cache")).expect("create dir");
        File::create(root.join(".cache").join("Saga #002 (2012).cbz")).expect("create file");

        let index = ExternalIndex::scan(root).expect("scan");
        assert!(index.is_empty());
    }

    #[test]
    fn scan_ignores_nested_folders() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("Batman").join("Extras");
        fs::create_dir_all(&nested).expect("create dir");
        File::create(nested.join("Batman #005 (2016).cbz")).expect("create file");

        let index = ExternalIndex::scan(dir.path()).expect("scan");
        assert!(!index.contains("batman", &IdentityKey::Issue(5)));
    }

    #[test]
    fn scan_missing_directory_is_error() {
        let dir = tempdir().expect("tempdir");
        assert!(ExternalIndex::scan(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn folder_match_is_case_insensitive() {
        let index = ExternalIndex::from_names([("BATMAN", "batman 1 (2024).cbr")]);
        assert!(index.contains("batman", &IdentityKey::Issue(1)));
    }

    #[test]
    fn standalone_identity_matches_display_name() {
        let index = ExternalIndex::from_names([("Batman - The Killing Joke", "Batman - The Killing Joke (1988).cbr")]);
        let identity = parse_filename("batman - the killing joke (1988) (digital).cbz")
            .identity()
            .expect("identity");
        assert!(index.contains("batman - the killing joke", &identity));
    }
}
