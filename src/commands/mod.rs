use clap::Args;
use std::path::PathBuf;

use resuffix::config::{ConfigLayer, FolderEntry, SuffixConfig};
use resuffix::suffix::RunOptions;

pub type CmdResult<T> = resuffix::Result<(T, i32)>;

/// Exit code when `--keep-going` finished with recorded failures.
pub const EXIT_PARTIAL_FAILURE: i32 = 3;

/// Options that shape the suffix configuration.
#[derive(Args, Debug, Default)]
pub struct SuffixConfigArgs {
    /// Suffix appended to basenames (default: _beach)
    #[arg(long)]
    pub suffix: Option<String>,

    /// Folder to rename, as OLD or OLD=NEW (repeatable; replaces the default table)
    #[arg(long = "folder", value_name = "OLD[=NEW]")]
    pub folders: Vec<String>,

    /// Basename stem never renamed, glob patterns allowed (repeatable; replaces the default list)
    #[arg(long = "skip", value_name = "STEM")]
    pub skip: Vec<String>,

    /// Sibling module rewritten from './NAME' to './NAME<suffix>' (repeatable)
    #[arg(long = "entry", value_name = "NAME")]
    pub entry_points: Vec<String>,

    /// JSON file with configuration fields; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,
}

impl SuffixConfigArgs {
    /// Flag values as a config layer. Empty repeatable flags leave the field unset.
    fn to_layer(&self) -> resuffix::Result<ConfigLayer> {
        let folders = if self.folders.is_empty() {
            None
        } else {
            Some(
                self.folders
                    .iter()
                    .map(|spec| FolderEntry::parse(spec))
                    .collect::<resuffix::Result<Vec<_>>>()?,
            )
        };

        Ok(ConfigLayer {
            suffix: self.suffix.clone(),
            folders,
            skip: non_empty(&self.skip),
            entry_points: non_empty(&self.entry_points),
            ..Default::default()
        })
    }

    /// Resolve defaults < config file < flags.
    pub fn resolve(&self) -> resuffix::Result<SuffixConfig> {
        let mut layers = Vec::new();
        if let Some(path) = &self.config {
            layers.push(ConfigLayer::load(&expand_path(path, "config")?)?);
        }
        layers.push(self.to_layer()?);
        SuffixConfig::resolve(layers)
    }
}

/// Arguments shared by commands that operate on a source tree.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Root of the frontend source tree
    pub root: String,

    #[command(flatten)]
    pub config: SuffixConfigArgs,

    /// Report what would change without touching disk
    #[arg(long)]
    pub dry_run: bool,

    /// Record per-file failures and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,
}

impl TreeArgs {
    pub fn root_path(&self) -> resuffix::Result<PathBuf> {
        let root = resuffix::utils::validation::require_non_empty(
            &self.root,
            "root",
            "Root directory cannot be empty",
        )?;
        let root = expand_path(root, "root")?;
        resuffix::suffix::validate_root(&root)?;
        Ok(root)
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            keep_going: self.keep_going,
        }
    }
}

/// Expand `~` and `$VARS` in a path argument.
fn expand_path(raw: &str, field: &str) -> resuffix::Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        resuffix::Error::validation_invalid_argument(
            field,
            format!("Cannot expand '{}': {}", raw, e),
            Some(raw.to_string()),
        )
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Exit code for a finished run: partial failure when anything was recorded.
pub(crate) fn exit_code_for_failures(failures: usize) -> i32 {
    if failures > 0 {
        EXIT_PARTIAL_FAILURE
    } else {
        0
    }
}

pub mod config;
pub mod files;
pub mod imports;
pub mod run;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (resuffix::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Run(args) => dispatch!(args, run),
        crate::Commands::Files(args) => dispatch!(args, files),
        crate::Commands::Imports(args) => dispatch!(args, imports),
        crate::Commands::Config(args) => dispatch!(args, config),
    }
}
