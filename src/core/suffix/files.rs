//! Phase 1: rename folders from the folder table and suffix script basenames.
//!
//! Reruns are safe: suffixed stems and skip-listed stems are left alone, and a
//! rename whose target already exists is recorded as a collision instead of
//! clobbering the target.

use super::walk::{self, Entry};
use super::{Failure, RunOptions};
use crate::config::SuffixConfig;
use crate::error::Result;
use crate::utils::io;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameKind {
    /// Entry listed in the folder table (usually a directory).
    Folder,
    /// Script file suffixed before its extension.
    File,
}

/// A rename performed (or planned, in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRename {
    /// Path relative to root before the rename.
    pub from: String,
    /// Path relative to root after the rename.
    pub to: String,
    pub kind: RenameKind,
}

/// A rename skipped because its target already exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameCollision {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    pub renames: Vec<FileRename>,
    pub collisions: Vec<RenameCollision>,
    /// Old script stem -> new stem, including collisions.
    pub correspondence: BTreeMap<String, String>,
    pub failures: Vec<Failure>,
}

impl RenameReport {
    pub fn total_renamed(&self) -> usize {
        self.renames.len()
    }

    /// Where a root-relative path ends up once the recorded renames apply.
    ///
    /// Renames are replayed in walk order, so a file under a renamed folder
    /// picks up both the folder and its own rename.
    pub fn renamed_path(&self, path: &str) -> String {
        let mut current = path.to_string();
        for rename in &self.renames {
            if current == rename.from {
                current = rename.to.clone();
            } else if let Some(rest) = current
                .strip_prefix(rename.from.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                current = format!("{}/{}", rename.to, rest);
            }
        }
        current
    }
}

/// An entry's place on disk and the place it has once earlier renames apply.
/// The two only differ in dry-run mode, where folders are never moved.
#[derive(Debug, Clone)]
struct Location {
    disk: PathBuf,
    logical: PathBuf,
}

impl Location {
    fn root(root: &Path) -> Self {
        Location {
            disk: root.to_path_buf(),
            logical: root.to_path_buf(),
        }
    }

    fn join(&self, name: &str) -> Self {
        Location {
            disk: self.disk.join(name),
            logical: self.logical.join(name),
        }
    }
}

/// Run the rename phase over `root`.
pub fn rename_files(root: &Path, config: &SuffixConfig, options: &RunOptions) -> Result<RenameReport> {
    let mut report = RenameReport::default();
    rename_in_dir(&Location::root(root), root, config, options, &mut report)?;
    Ok(report)
}

fn rename_in_dir(
    dir: &Location,
    root: &Path,
    config: &SuffixConfig,
    options: &RunOptions,
    report: &mut RenameReport,
) -> Result<()> {
    let rel_dir = walk::relative(&dir.logical, root);
    let listing = walk::read_entries(&dir.disk, &rel_dir, options, &mut report.failures);
    let Some(entries) = options.absorb(listing, rel_dir, &mut report.failures)?
    else {
        return Ok(());
    };

    for entry in entries {
        let current = dir.join(&entry.name);

        if let Some(mapping) = config.folder_for(&entry.name) {
            let target = dir.join(&mapping.to);
            let next = apply_rename(&current, &target, RenameKind::Folder, root, options, report)?;
            if entry.is_dir {
                rename_in_dir(&next, root, config, options, report)?;
            }
            continue;
        }

        if entry.is_dir {
            rename_in_dir(&current, root, config, options, report)?;
            continue;
        }

        let Some(new_name) = suffixed_script_name(&entry, config) else {
            continue;
        };
        report.correspondence.insert(
            entry.stem().to_string(),
            format!("{}{}", entry.stem(), config.suffix),
        );
        let target = dir.join(&new_name);
        apply_rename(&current, &target, RenameKind::File, root, options, report)?;
    }

    Ok(())
}

/// New name for a script file that still needs the suffix, or `None`.
pub(crate) fn suffixed_script_name(entry: &Entry, config: &SuffixConfig) -> Option<String> {
    let ext = entry.extension()?;
    if !config.is_script(&ext) {
        return None;
    }
    let stem = entry.stem();
    if stem.ends_with(&config.suffix) || config.is_skipped(stem) {
        return None;
    }
    Some(config.suffixed_name(&entry.name))
}

/// Rename `from` to `to` unless `to` exists. Returns the entry's location
/// after this step, so callers can keep walking into renamed directories.
/// In dry-run mode the entry stays on disk but moves logically.
fn apply_rename(
    from: &Location,
    to: &Location,
    kind: RenameKind,
    root: &Path,
    options: &RunOptions,
    report: &mut RenameReport,
) -> Result<Location> {
    let rel_from = walk::relative(&from.logical, root);
    let rel_to = walk::relative(&to.logical, root);

    if to.disk.symlink_metadata().is_ok() {
        log_status!("resuffix", "Skipped (target exists): {} -> {}", rel_from, rel_to);
        report.collisions.push(RenameCollision {
            from: rel_from,
            to: rel_to,
        });
        return Ok(from.clone());
    }

    if options.dry_run {
        log_status!("resuffix", "Would rename: {} -> {}", rel_from, rel_to);
        report.renames.push(FileRename {
            from: rel_from,
            to: rel_to,
            kind,
        });
        return Ok(Location {
            disk: from.disk.clone(),
            logical: to.logical.clone(),
        });
    }

    let renamed = options.absorb(
        io::rename_path(&from.disk, &to.disk),
        rel_from.clone(),
        &mut report.failures,
    )?;
    if renamed.is_none() {
        return Ok(from.clone());
    }

    log_status!("resuffix", "Renamed: {} -> {}", rel_from, rel_to);
    report.renames.push(FileRename {
        from: rel_from,
        to: rel_to,
        kind,
    });
    Ok(to.clone())
}
