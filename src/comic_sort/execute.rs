use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::comic_sort::organize::{Plan, PlannedAction, PlannedMove};
use crate::comic_sort::types::RunResult;
use crate::{path_to_string, print_error, print_warning, show_diff};

/// Capability to move a single file.
pub trait FileMover {
    /// Move `source` to `destination`, creating missing parent directories.
    ///
    /// # Errors
    /// Returns an error if the file could not be moved.
    fn move_file(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Moves files on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

/// Applies a [`Plan`] under the input directory and counts the outcome of each file.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    root: &'a Path,
    dry_run: bool,
    verbose: bool,
}

impl FileMover for FsMover {
    fn move_file(&self, source: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::CrossesDevices => {
                fs::copy(source, destination)
                    .with_context(|| format!("Failed to copy to {}", destination.display()))?;
                fs::remove_file(source).with_context(|| format!("Failed to remove {}", source.display()))
            }
            Err(error) => {
                Err(error).with_context(|| format!("Failed to rename to {}", destination.display()))
            }
        }
    }
}

impl<'a> Executor<'a> {
    /// In dry run mode nothing is moved, but existing destinations are still checked.
    #[must_use]
    pub const fn new(root: &'a Path, dry_run: bool, verbose: bool) -> Self {
        Self { root, dry_run, verbose }
    }

    /// Apply every planned move. A failing file is counted as an error and never stops the run.
    pub fn run(&self, plan: &Plan, mover: &impl FileMover) -> RunResult {
        let mut result = RunResult::default();
        for planned in plan.moves() {
            self.apply(planned, mover, &mut result);
        }
        result
    }

    fn apply(&self, planned: &PlannedMove, mover: &impl FileMover, result: &mut RunResult) {
        let name = planned.entry().file_name();
        let target = path_to_string(planned.destination());

        match planned.action() {
            PlannedAction::Skip => {
                if self.verbose {
                    println!("{}: {name}", "OK       ".green());
                }
                result.record_skipped();
                return;
            }
            PlannedAction::Conflict => {
                print_warning!("CONFLICT : {name} -> {target} (claimed by another file)");
                result.record_error(format!("{name} (conflicting destination)"));
                return;
            }
            PlannedAction::Move | PlannedAction::Error => {}
        }

        let source = self.root.join(planned.entry().source());
        let destination = self.root.join(planned.destination());

        if destination.exists() {
            match files_identical(&source, &destination) {
                Ok(true) => {
                    if self.verbose {
                        println!("{}: {name} (identical file already at {target})", "OK       ".green());
                    }
                    result.record_skipped();
                }
                Ok(false) => {
                    print_warning!("CONFLICT : {name} -> {target} (destination exists)");
                    result.record_error(format!("{name} (destination exists)"));
                }
                Err(error) => {
                    print_error!("Failed to compare {name} with {target}: {error}");
                    result.record_error(format!("{name} (destination exists)"));
                }
            }
            return;
        }

        if self.verbose || self.dry_run {
            self.print_decision(planned, &target);
        }

        if !self.dry_run
            && let Err(error) = mover.move_file(&source, &destination)
        {
            print_error!("Failed to move {name}: {error:#}");
            result.record_error(format!("{name} (move failed)"));
            return;
        }

        if planned.action() == PlannedAction::Error {
            result.record_error(name.to_string());
        } else {
            result.record_renamed();
            if planned.is_duplicate() {
                result.record_duplicate(name, &planned.destination_name());
            }
        }
    }

    fn print_decision(&self, planned: &PlannedMove, target: &str) {
        let name = planned.entry().file_name();
        match planned.action() {
            PlannedAction::Error => println!("{}: {name} -> {target}", "ERROR    ".red()),
            _ if planned.is_duplicate() => println!("{}: {name} -> {target}", "DUPLICATE".magenta()),
            _ => println!("{}: {name} -> {target}", "RENAME   ".cyan()),
        }
        if self.verbose && planned.action() == PlannedAction::Move {
            show_diff(name, &planned.destination_name());
        }
    }
}

/// Compare two files byte by byte.
///
/// # Errors
/// Returns an error if either file cannot be read.
pub fn files_identical(first: &Path, second: &Path) -> std::io::Result<bool> {
    if fs::metadata(first)?.len() != fs::metadata(second)?.len() {
        return Ok(false);
    }

    let mut first_reader = BufReader::new(File::open(first)?);
    let mut second_reader = BufReader::new(File::open(second)?);
    loop {
        let first_buffer = first_reader.fill_buf()?;
        let second_buffer = second_reader.fill_buf()?;
        if first_buffer.is_empty() && second_buffer.is_empty() {
            return Ok(true);
        }
        let length = first_buffer.len().min(second_buffer.len());
        if length == 0 || first_buffer[..length] != second_buffer[..length] {
            return Ok(false);
        }
        first_reader.consume(length);
        second_reader.consume(length);
    }
}
