//! Comic archive filename normalization and organization.
//!
//! Parses `.cbz`/`.cbr` filenames into issues, volumes and standalone books,
//! plans where each file should live under its title folder,
//! and flags title groups that already exist in an external collection.

mod config;
mod execute;
mod external;
mod format;
mod organize;
mod parse;
mod scan;
mod types;

pub use config::{
    ComicSortUserConfig, ENV_FILE_NAME, EXTERNAL_DIR_VAR, first_configured_dir, read_env_file_value,
    resolve_external_dir,
};
pub use execute::{Executor, FileMover, FsMover, files_identical};
pub use external::ExternalIndex;
pub use format::{capitalize_title, clean_title, format_issue, format_volume, title_key};
pub use organize::{
    DUPLICATES_DIR_NAME, ERROR_DIR_NAME, Organizer, Plan, PlannedAction, PlannedMove, TitleGroup,
};
pub use parse::{is_comic_extension, parse_filename};
pub use scan::collect_comic_files;
pub use types::{ComicEntry, ComicKind, IdentityKey, ParsedFilename, RunResult};
