use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::comic_sort::external::ExternalIndex;
use crate::comic_sort::format::capitalize_title;
use crate::comic_sort::types::{ComicEntry, RunResult};
use crate::path_to_string;

/// Folder for files whose name could not be parsed.
pub const ERROR_DIR_NAME: &str = "error";

/// Folder for title groups that already exist in the external collection.
pub const DUPLICATES_DIR_NAME: &str = "possibleDuplicates";

/// Parsed files sharing the same case-folded title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleGroup {
    key: String,
    title: String,
    members: Vec<ComicEntry>,
    duplicate: bool,
}

/// What should happen to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    /// Move to the normalized destination.
    Move,
    /// Already at its destination.
    Skip,
    /// Unparseable, move to the error folder.
    Error,
    /// Another file in this run already claimed the same destination.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    entry: ComicEntry,
    /// Destination relative to the input directory.
    destination: PathBuf,
    action: PlannedAction,
    duplicate: bool,
}

/// Destinations for every file of a run, in source path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    moves: Vec<PlannedMove>,
    groups: Vec<TitleGroup>,
}

/// Groups parsed files by title and decides their destinations.
#[derive(Debug, Clone, Copy)]
pub struct Organizer {
    capitalize: bool,
}

impl Default for Organizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Organizer {
    /// With `capitalize`, display titles are word-capitalized,
    /// otherwise the first member's title casing is used for the whole group.
    #[must_use]
    pub const fn new(capitalize: bool) -> Self {
        Self { capitalize }
    }

    /// Group parsed entries by case-folded title, keeping first-seen order.
    ///
    /// Unparseable entries never belong to a group.
    #[must_use]
    pub fn group(&self, entries: &[ComicEntry]) -> Vec<TitleGroup> {
        let mut groups: Vec<TitleGroup> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in entries.iter().filter(|entry| entry.parsed().is_parsed()) {
            let key = entry.parsed().title_key();
            if let Some(&position) = positions.get(&key) {
                groups[position].members.push(entry.clone());
            } else {
                positions.insert(key.clone(), groups.len());
                groups.push(TitleGroup {
                    key,
                    title: self.display_title(entry.parsed().title()),
                    members: vec![entry.clone()],
                    duplicate: false,
                });
            }
        }

        groups
    }

    /// Plan destinations for all entries.
    ///
    /// When an external index is given, a title group with any member already present
    /// in the index is redirected as a whole to the possible duplicates folder.
    #[must_use]
    pub fn organize(&self, mut entries: Vec<ComicEntry>, external: Option<&ExternalIndex>) -> Plan {
        entries.sort_by(|a, b| a.source().cmp(b.source()));

        let mut groups = self.group(&entries);
        if let Some(index) = external {
            for group in &mut groups {
                group.duplicate = group.members.iter().any(|member| {
                    member
                        .parsed()
                        .identity()
                        .is_some_and(|identity| index.contains(&group.key, &identity))
                });
            }
        }

        let groups_by_key: HashMap<&str, &TitleGroup> =
            groups.iter().map(|group| (group.key.as_str(), group)).collect();

        let targets: Vec<(ComicEntry, PathBuf, bool)> = entries
            .into_iter()
            .map(|entry| {
                let group = groups_by_key.get(entry.parsed().title_key().as_str()).copied();
                let (destination, duplicate) = Self::destination(&entry, group);
                (entry, destination, duplicate)
            })
            .collect();

        // Files already in place keep their destination, later claims on the same path conflict.
        let mut claimed: HashSet<String> = targets
            .iter()
            .filter(|(entry, destination, _)| entry.source() == destination)
            .map(|(_, destination, _)| destination_key(destination))
            .collect();

        let moves = targets
            .into_iter()
            .map(|(entry, destination, duplicate)| {
                let action = if entry.source() == destination {
                    PlannedAction::Skip
                } else if !claimed.insert(destination_key(&destination)) {
                    PlannedAction::Conflict
                } else if entry.parsed().is_parsed() {
                    PlannedAction::Move
                } else {
                    PlannedAction::Error
                };
                PlannedMove {
                    entry,
                    destination,
                    action,
                    duplicate,
                }
            })
            .collect();

        Plan { moves, groups }
    }

    fn display_title(&self, title: &str) -> String {
        if self.capitalize {
            capitalize_title(title)
        } else {
            title.to_string()
        }
    }

    fn destination(entry: &ComicEntry, group: Option<&TitleGroup>) -> (PathBuf, bool) {
        let normalized = group.and_then(|group| {
            entry
                .parsed()
                .normalized_name(&group.title)
                .map(|name| (group, name))
        });
        match normalized {
            Some((group, name)) if group.duplicate => (
                PathBuf::from(DUPLICATES_DIR_NAME).join(&group.title).join(name),
                true,
            ),
            Some((group, name)) => (PathBuf::from(&group.title).join(name), false),
            None => (PathBuf::from(ERROR_DIR_NAME).join(entry.file_name()), false),
        }
    }
}

/// Destinations are compared case-insensitively so the plan holds on case-insensitive filesystems.
fn destination_key(destination: &Path) -> String {
    path_to_string(destination).to_lowercase()
}

impl TitleGroup {
    /// Case-folded title.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display title used for the folder and filenames.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn members(&self) -> &[ComicEntry] {
        &self.members
    }

    /// Any member already exists in the external collection.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        self.duplicate
    }
}

impl PlannedMove {
    #[must_use]
    pub const fn entry(&self) -> &ComicEntry {
        &self.entry
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub const fn action(&self) -> PlannedAction {
        self.action
    }

    /// Redirected because its title group exists in the external collection.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    /// Normalized filename at the destination.
    #[must_use]
    pub fn destination_name(&self) -> String {
        crate::path_to_filename_string(&self.destination)
    }
}

impl Plan {
    #[must_use]
    pub fn moves(&self) -> &[PlannedMove] {
        &self.moves
    }

    #[must_use]
    pub fn groups(&self) -> &[TitleGroup] {
        &self.groups
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Counts as if every planned action succeeds.
    #[must_use]
    pub fn result(&self) -> RunResult {
        let mut result = RunResult::default();
        for planned in &self.moves {
            match planned.action {
                PlannedAction::Move => {
                    result.record_renamed();
                    if planned.duplicate {
                        result.record_duplicate(planned.entry.file_name(), &planned.destination_name());
                    }
                }
                PlannedAction::Skip => result.record_skipped(),
                PlannedAction::Error => result.record_error(planned.entry.file_name().to_string()),
                PlannedAction::Conflict => {
                    result.record_error(format!("{} (conflicting destination)", planned.entry.file_name()));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod organize_tests {
    use super::*;

    use crate::comic_sort::types::ComicKind;

    fn entries(names: &[&str]) -> Vec<ComicEntry> {
        names.iter().map(|name| ComicEntry::from_name(name)).collect()
    }

    fn destinations(plan: &Plan) -> Vec<(String, String)> {
        plan.moves()
            .iter()
            .map(|planned| {
                (
                    planned.entry().file_name().to_string(),
                    path_to_string(planned.destination()),
                )
            })
            .collect()
    }

    fn destination_of(plan: &Plan, name: &str) -> PathBuf {
        plan.moves()
            .iter()
            .find(|planned| planned.entry().file_name() == name)
            .map(|planned| planned.destination().to_path_buf())
            .unwrap_or_else(|| panic!("{name} missing from plan"))
    }

    const SCENARIO: [&str; 4] = [
        "Batman #1 (2025).cbz",
        "Batman 002 (2025).cbr",
        "watchmen v02 (2012).cbr",
        "gibberish.cbz",
    ];

    #[test]
    fn scenario_without_external_index() {
        let plan = Organizer::default().organize(entries(&SCENARIO), None);

        assert_eq!(
            destination_of(&plan, "Batman #1 (2025).cbz"),
            Path::new("Batman").join("Batman #001 (2025).cbz")
        );
        assert_eq!(
            destination_of(&plan, "Batman 002 (2025).cbr"),
            Path::new("Batman").join("Batman #002 (2025).cbr")
        );
        assert_eq!(
            destination_of(&plan, "watchmen v02 (2012).cbr"),
            Path::new("Watchmen").join("Watchmen Vol. 2 (2012).cbr")
        );
        assert_eq!(
            destination_of(&plan, "gibberish.cbz"),
            Path::new(ERROR_DIR_NAME).join("gibberish.cbz")
        );

        let result = plan.result();
        assert_eq!(result.renamed, 3);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors, 1);
        assert_eq!(result.duplicates, 0);
        assert_eq!(result.error_list, vec!["gibberish.cbz"]);
        assert!(result.duplicate_list.is_empty());
    }

    #[test]
    fn scenario_with_external_index_moves_whole_group() {
        let index = ExternalIndex::from_names([("Batman", "Batman #001 (2024).cbr")]);
        let plan = Organizer::default().organize(entries(&SCENARIO), Some(&index));

        assert_eq!(
            destination_of(&plan, "Batman #1 (2025).cbz"),
            Path::new(DUPLICATES_DIR_NAME).join("Batman").join("Batman #001 (2025).cbz")
        );
        assert_eq!(
            destination_of(&plan, "Batman 002 (2025).cbr"),
            Path::new(DUPLICATES_DIR_NAME).join("Batman").join("Batman #002 (2025).cbr")
        );
        assert_eq!(
            destination_of(&plan, "watchmen v02 (2012).cbr"),
            Path::new("Watchmen").join("Watchmen Vol. 2 (2012).cbr")
        );

        let result = plan.result();
        assert_eq!(result.renamed, 3);
        assert_eq!(result.errors, 1);
        assert_eq!(result.duplicates, 2);
        assert_eq!(
            result.duplicate_list,
            vec![
                "Batman #1 (2025).cbz → Batman #001 (2025).cbz",
                "Batman 002 (2025).cbr → Batman #002 (2025).cbr",
            ]
        );
    }

    #[test]
    fn no_index_never_routes_to_duplicates() {
        let plan = Organizer::default().organize(entries(&SCENARIO), None);
        assert!(
            plan.moves()
                .iter()
                .all(|planned| !planned.destination().starts_with(DUPLICATES_DIR_NAME))
        );
        assert!(plan.groups().iter().all(|group| !group.is_duplicate()));
    }

    #[test]
    fn empty_index_finds_no_duplicates() {
        let index = ExternalIndex::default();
        let plan = Organizer::default().organize(entries(&SCENARIO), Some(&index));
        assert_eq!(plan.result().duplicates, 0);
    }

    #[test]
    fn case_variants_group_together_and_match_other_extension() {
        let names = ["batman #002 (2025).cbz", "BATMAN #001 (2025).CBZ"];
        let organizer = Organizer::default();

        let groups = organizer.group(&entries(&names));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), "batman");
        assert_eq!(groups[0].title(), "Batman");
        assert_eq!(groups[0].members().len(), 2);

        let index = ExternalIndex::from_names([("Batman", "Batman #001 (2024).cbr")]);
        let plan = organizer.organize(entries(&names), Some(&index));
        assert!(plan.moves().iter().all(PlannedMove::is_duplicate));
        assert_eq!(plan.result().duplicates, 2);
        assert_eq!(
            destination_of(&plan, "BATMAN #001 (2025).CBZ"),
            Path::new(DUPLICATES_DIR_NAME).join("Batman").join("Batman #001 (2025).CBZ")
        );
    }

    #[test]
    fn duplicate_matching_ignores_other_titles() {
        let index = ExternalIndex::from_names([("Superman", "Superman #001 (2024).cbr")]);
        let plan = Organizer::default().organize(entries(&SCENARIO), Some(&index));
        assert_eq!(plan.result().duplicates, 0);
    }

    #[test]
    fn every_parsed_entry_is_in_exactly_one_group() {
        let names = [
            "Batman #1 (2025).cbz",
            "batman 2 (2025).cbz",
            "Saga v01 (2012).cbz",
            "SAGA #054 (2018).cbr",
            "Batman - Year One.cbz",
            "gibberish.cbz",
            "notes.cbr",
        ];
        let all = entries(&names);
        let groups = Organizer::default().group(&all);

        for entry in &all {
            let count = groups
                .iter()
                .filter(|group| group.members().contains(entry))
                .count();
            let expected = usize::from(entry.parsed().kind() != ComicKind::Unparseable);
            assert_eq!(count, expected, "{}", entry.file_name());
        }
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn without_capitalize_first_member_casing_wins() {
        let names = ["x-men #002.cbz", "X-Men #001.cbz"];
        let plan = Organizer::new(false).organize(entries(&names), None);
        assert_eq!(
            destinations(&plan),
            vec![
                ("X-Men #001.cbz".to_string(), path_to_string(&Path::new("X-Men").join("X-Men #001.cbz"))),
                ("x-men #002.cbz".to_string(), path_to_string(&Path::new("X-Men").join("X-Men #002.cbz"))),
            ]
        );
    }

    #[test]
    fn same_destination_twice_is_conflict() {
        let names = ["Batman #1 (2025).cbz", "Batman 001 (2025).cbz"];
        let plan = Organizer::default().organize(entries(&names), None);
        let actions: Vec<PlannedAction> = plan.moves().iter().map(PlannedMove::action).collect();
        assert_eq!(actions, vec![PlannedAction::Move, PlannedAction::Conflict]);

        let result = plan.result();
        assert_eq!(result.renamed, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(result.error_list, vec!["Batman 001 (2025).cbz (conflicting destination)"]);
    }

    #[test]
    fn file_already_in_place_is_skipped_and_wins_conflict() {
        let in_place = ComicEntry::new(Path::new("Batman").join("Batman #001 (2025).cbz"));
        let loose = ComicEntry::from_name("batman 1 (2025).cbz");
        let plan = Organizer::default().organize(vec![loose, in_place], None);

        let actions: Vec<(String, PlannedAction)> = plan
            .moves()
            .iter()
            .map(|planned| (planned.entry().file_name().to_string(), planned.action()))
            .collect();
        assert!(actions.contains(&("Batman #001 (2025).cbz".to_string(), PlannedAction::Skip)));
        assert!(actions.contains(&("batman 1 (2025).cbz".to_string(), PlannedAction::Conflict)));

        let result = plan.result();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn every_file_counts_exactly_once() {
        let names = [
            "Batman #1 (2025).cbz",
            "Batman 001 (2025).cbz",
            "gibberish.cbz",
            "Saga (Deluxe Edition).cbz",
            "Absolute Batman 2025 Annual 001 (2025).cbz",
        ];
        let index = ExternalIndex::from_names([("Absolute Batman", "Absolute Batman #001 (2024).cbz")]);
        let plan = Organizer::default().organize(entries(&names), Some(&index));
        let result = plan.result();
        assert_eq!(result.total(), names.len());
        assert_eq!(result.duplicates, 0);
    }

    #[test]
    fn annual_groups_under_base_title() {
        let names = ["Absolute Batman 2025 Annual 001 (2025).cbz", "Absolute Batman #003 (2025).cbz"];
        let plan = Organizer::default().organize(entries(&names), None);
        assert_eq!(plan.groups().len(), 1);
        assert_eq!(
            destination_of(&plan, "Absolute Batman 2025 Annual 001 (2025).cbz"),
            Path::new("Absolute Batman").join("Absolute Batman 2025 Annual #001 (2025).cbz")
        );
    }
}
