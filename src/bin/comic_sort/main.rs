mod comic_sort;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::comic_sort::ComicSort;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Normalize comic archive names and sort them into title folders"
)]
pub(crate) struct Args {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Enable debug prints
    #[arg(short = 'D', long)]
    debug: bool,

    /// Only print changes without moving files
    #[arg(short = 'p', long, visible_alias = "print")]
    dry_run: bool,

    /// External collection to check for possible duplicates
    #[arg(short = 'x', long, value_hint = clap::ValueHint::DirPath, value_name = "DIR")]
    external: Option<PathBuf>,

    /// Keep title casing from the first file instead of capitalizing words
    #[arg(long)]
    no_capitalize: bool,

    /// Recurse into subdirectories
    #[arg(short = 'r', long)]
    recurse: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        comic_sorter::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        ComicSort::new(args)?.run()
    }
}
