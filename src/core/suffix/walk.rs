//! Directory walking shared by both phases.

use super::{Failure, RunOptions};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Directories never entered (dependency/VCS directories).
pub(crate) const ALWAYS_SKIP_DIRS: &[&str] = &["node_modules", ".git", ".svn", ".hg"];

/// A directory entry with a UTF-8 name.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

impl Entry {
    /// Lowercased extension of a file entry, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }

    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

/// List `dir` in name order. Symlinks are reported as files and never
/// followed; skipped directories are dropped.
///
/// An entry whose name is not valid UTF-8 fails the listing, or with
/// `keep_going` is recorded under `rel_dir` and left out.
pub(crate) fn read_entries(
    dir: &Path,
    rel_dir: &str,
    options: &RunOptions,
    failures: &mut Vec<Failure>,
) -> Result<Vec<Entry>> {
    let read = std::fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read dir {}", dir.display())))
    })?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read dir {}", dir.display())))
        })?;
        let file_type = entry.file_type().map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("stat {}", entry.path().display())),
            )
        })?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                let shown = join_relative(rel_dir, &raw.to_string_lossy());
                let err = Error::internal_io(
                    "File name is not valid UTF-8",
                    Some(format!("read dir {}", dir.display())),
                );
                options.absorb(Err::<(), _>(err), shown, failures)?;
                continue;
            }
        };
        let is_dir = file_type.is_dir();
        if is_dir && ALWAYS_SKIP_DIRS.contains(&name.as_str()) {
            continue;
        }
        entries.push(Entry {
            path: entry.path(),
            name,
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Collect every file under `root` accepted by `keep`, depth-first in name order.
pub(crate) fn walk_files<F>(
    root: &Path,
    keep: &F,
    options: &RunOptions,
    failures: &mut Vec<Failure>,
) -> Result<Vec<PathBuf>>
where
    F: Fn(&Entry) -> bool,
{
    let mut files = Vec::new();
    walk_recursive(root, root, keep, options, failures, &mut files)?;
    Ok(files)
}

fn walk_recursive<F>(
    dir: &Path,
    root: &Path,
    keep: &F,
    options: &RunOptions,
    failures: &mut Vec<Failure>,
    files: &mut Vec<PathBuf>,
) -> Result<()>
where
    F: Fn(&Entry) -> bool,
{
    for entry in read_entries(dir, &relative(dir, root), options, failures)? {
        if entry.is_dir {
            walk_recursive(&entry.path, root, keep, options, failures, files)?;
        } else if keep(&entry) {
            files.push(entry.path);
        }
    }
    Ok(())
}

fn join_relative(rel_dir: &str, name: &str) -> String {
    if rel_dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", rel_dir, name)
    }
}

/// Path of `path` relative to `root`, with `/` separators.
pub(crate) fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_files_is_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/z.js"), "").unwrap();
        fs::write(root.join("b/a.js"), "").unwrap();
        fs::write(root.join("a.css"), "").unwrap();
        fs::write(root.join("logo.png"), "").unwrap();

        let keep = |e: &Entry| e.extension().as_deref() != Some("png");
        let files = walk_files(root, &keep, &RunOptions::default(), &mut Vec::new()).unwrap();
        let names: Vec<String> = files.iter().map(|f| relative(f, root)).collect();
        assert_eq!(names, vec!["a.css", "b/a.js", "b/z.js"]);
    }

    #[test]
    fn dependency_dirs_are_skipped_at_any_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::create_dir_all(root.join("pkg/node_modules/x")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("node_modules/react/index.js"), "").unwrap();
        fs::write(root.join("pkg/node_modules/x/index.js"), "").unwrap();
        fs::write(root.join(".git/HEAD.js"), "").unwrap();
        fs::write(root.join("pkg/main.js"), "").unwrap();

        let keep = |_: &Entry| true;
        let files = walk_files(root, &keep, &RunOptions::default(), &mut Vec::new()).unwrap();
        let names: Vec<String> = files.iter().map(|f| relative(f, root)).collect();
        assert_eq!(names, vec!["pkg/main.js"]);
    }

    #[test]
    fn read_entries_errors_on_missing_dir() {
        let err = read_entries(
            Path::new("/nonexistent/resuffix"),
            "",
            &RunOptions::default(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_fail_or_are_recorded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("pages").join(OsStr::from_bytes(b"bad\xff.js")), "").unwrap();
        fs::write(root.join("pages/good.js"), "").unwrap();
        let keep = |_: &Entry| true;

        let err = walk_files(root, &keep, &RunOptions::default(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");

        let options = RunOptions {
            keep_going: true,
            ..Default::default()
        };
        let mut failures = Vec::new();
        let files = walk_files(root, &keep, &options, &mut failures).unwrap();
        let names: Vec<String> = files.iter().map(|f| relative(f, root)).collect();
        assert_eq!(names, vec!["pages/good.js"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "pages/bad\u{FFFD}.js");
        assert_eq!(failures[0].code, "internal.io_error");
    }

    #[test]
    fn entry_stem_and_extension() {
        let entry = Entry {
            path: PathBuf::from("Button.JSX"),
            name: "Button.JSX".to_string(),
            is_dir: false,
        };
        assert_eq!(entry.stem(), "Button");
        assert_eq!(entry.extension().as_deref(), Some("jsx"));
    }
}
