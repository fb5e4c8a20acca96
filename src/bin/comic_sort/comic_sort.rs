use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;

use comic_sorter::comic_sort::{
    Executor, ExternalIndex, FsMover, Organizer, RunResult, collect_comic_files,
};
use comic_sorter::{print_bold, print_warning, resolve_input_dir};

use crate::Args;
use crate::config::Config;

/// Sort comic archives in a directory into title folders.
pub struct ComicSort {
    config: Config,
    root: PathBuf,
}

impl ComicSort {
    /// Create from command line arguments.
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::from_args(args)?;
        let root = resolve_input_dir(config.path.as_deref())?;
        Ok(Self { config, root })
    }

    /// Scan, plan and apply the moves, then print the summary.
    pub fn run(&self) -> Result<()> {
        if self.config.debug {
            println!("{}", self.config);
            println!("  input:      {}", self.root.display());
        }

        let external = self.external_index();
        let entries = collect_comic_files(&self.root, self.config.recurse)?;
        if entries.is_empty() {
            println!("No comic files found in: {}", self.root.display());
            return Ok(());
        }

        let plan = Organizer::new(self.config.capitalize).organize(entries, external.as_ref());
        if self.config.dryrun {
            println!("{}", "DRYRUN".cyan().bold());
        }

        let result = Executor::new(&self.root, self.config.dryrun, self.config.verbose).run(&plan, &FsMover);
        Self::print_summary(&result);
        Ok(())
    }

    /// Build the external index if a usable directory was configured.
    ///
    /// A missing or unreadable directory disables duplicate detection.
    fn external_index(&self) -> Option<ExternalIndex> {
        let Some(dir) = self.config.external_dir.as_deref() else {
            if self.config.verbose {
                println!("External directory not configured, duplicate check disabled");
            }
            return None;
        };
        if !dir.is_dir() {
            if self.config.verbose {
                println!(
                    "External directory not found: {}, duplicate check disabled",
                    dir.display()
                );
            }
            return None;
        }
        match ExternalIndex::scan(dir) {
            Ok(index) => {
                if self.config.verbose {
                    println!(
                        "External directory: {} ({} comics in {} titles)",
                        dir.display(),
                        index.len(),
                        index.title_count()
                    );
                }
                Some(index)
            }
            Err(error) => {
                print_warning!("{error}, duplicate check disabled");
                None
            }
        }
    }

    fn print_summary(result: &RunResult) {
        println!();
        print_bold!("{result}");
        if !result.error_list.is_empty() {
            print_bold!("\nFiles moved to error:");
            println!("{}", numbered(&result.error_list));
        }
        if !result.duplicate_list.is_empty() {
            print_bold!("\nPossible duplicates:");
            println!("{}", numbered(&result.duplicate_list));
        }
    }
}

fn numbered(lines: &[String]) -> String {
    let width = lines.len().to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| format!("{:>width$}: {line}", index + 1))
        .join("\n")
}
