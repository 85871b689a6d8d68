//! Suffix renaming pipeline for a frontend source tree.
//!
//! Phase 1 ([`files`]) renames table folders and suffixes script basenames.
//! Phase 2 ([`imports`]) rewrites import paths in scripts and stylesheets to
//! match. Both phases are idempotent, so an interrupted run is resumed by
//! running again.

pub mod files;
pub mod imports;
mod walk;

pub use files::{rename_files, FileRename, RenameCollision, RenameKind, RenameReport};
pub use imports::{
    rewrite_content, rewrite_imports, FileUpdate, ImportRewriter, Rewrite, RewriteReport,
};

use crate::config::SuffixConfig;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Behavior switches shared by both phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report what would change without touching disk.
    pub dry_run: bool,
    /// Record per-file failures and continue instead of aborting.
    pub keep_going: bool,
}

impl RunOptions {
    /// Pass `Ok` through. With `keep_going`, turn `Err` into a recorded
    /// failure and `Ok(None)`; otherwise propagate it.
    pub(crate) fn absorb<T>(
        &self,
        result: Result<T>,
        path: String,
        failures: &mut Vec<Failure>,
    ) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.keep_going => {
                log_status!("resuffix", "Failed: {}: {}", path, err.summary());
                failures.push(Failure::new(path, &err));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// A per-path error recorded under `keep_going`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: String,
    pub code: String,
    pub error: String,
}

impl Failure {
    fn new(path: String, err: &Error) -> Self {
        Failure {
            path,
            code: err.code.as_str().to_string(),
            error: err.summary(),
        }
    }
}

/// Combined result of both phases.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub renames: RenameReport,
    pub imports: RewriteReport,
}

impl RunReport {
    pub fn failure_count(&self) -> usize {
        self.renames.failures.len() + self.imports.failures.len()
    }
}

/// Ensure `root` is an existing directory.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(Error::root_not_found(root.display().to_string()))
    }
}

/// Run the rename phase, then the rewrite phase.
pub fn run(root: &Path, config: &SuffixConfig, options: &RunOptions) -> Result<RunReport> {
    validate_root(root)?;

    log_status!("resuffix", "Phase 1: Renaming files...");
    let renames = rename_files(root, config, options)?;

    log_status!("resuffix", "Phase 2: Updating imports...");
    let mut imports = rewrite_imports(root, config, options)?;
    if options.dry_run {
        imports.relocate(&renames);
    }

    log_status!("resuffix", "Done!");
    Ok(RunReport {
        dry_run: options.dry_run,
        renames,
        imports,
    })
}
