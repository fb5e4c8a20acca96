use std::fmt;
use std::path::{Path, PathBuf};

use comic_sorter::colorize_bool;
use comic_sorter::comic_sort::{ComicSortUserConfig, ENV_FILE_NAME, resolve_external_dir};

use crate::Args;

/// Final config created from CLI arguments, the `.env` file and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) capitalize: bool,
    pub(crate) debug: bool,
    pub(crate) dryrun: bool,
    pub(crate) external_dir: Option<PathBuf>,
    pub(crate) path: Option<PathBuf>,
    pub(crate) recurse: bool,
    pub(crate) verbose: bool,
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let user_config = ComicSortUserConfig::get_user_config()?;
        let external_dir = resolve_external_dir(
            args.external.as_deref(),
            Path::new(ENV_FILE_NAME),
            user_config.external_dir.as_deref(),
        );

        Ok(Self {
            capitalize: !args.no_capitalize && user_config.capitalize,
            debug: args.debug || user_config.debug,
            dryrun: args.dry_run || user_config.dryrun,
            external_dir,
            path: args.path,
            recurse: args.recurse || user_config.recurse,
            verbose: args.verbose || user_config.verbose,
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let external = self
            .external_dir
            .as_ref()
            .map_or_else(|| "none".to_string(), |dir| dir.display().to_string());
        writeln!(f, "Config:")?;
        writeln!(f, "  capitalize: {}", colorize_bool(self.capitalize))?;
        writeln!(f, "  debug:      {}", colorize_bool(self.debug))?;
        writeln!(f, "  dryrun:     {}", colorize_bool(self.dryrun))?;
        writeln!(f, "  recurse:    {}", colorize_bool(self.recurse))?;
        writeln!(f, "  verbose:    {}", colorize_bool(self.verbose))?;
        write!(f, "  external:   {external}")
    }
}
