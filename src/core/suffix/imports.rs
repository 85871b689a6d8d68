//! Phase 2: retarget import/reference paths in script and stylesheet text.
//!
//! Three substitutions run over each file, in order:
//! 1. Folder segments: `/old/`, `'./old'` and `"./old"` become the table's new name.
//! 2. Filenames: quoted relative paths under a renamed folder get the suffix on
//!    their last component (assets, stylesheets and already-suffixed names excluded).
//! 3. Entry points: `'./App'` becomes `'./App_beach'`.
//!
//! Import forms not matching these literal shapes are left untouched.

use super::files::RenameReport;
use super::walk::{self, Entry};
use super::{Failure, RunOptions};
use crate::config::{insert_suffix, SuffixConfig};
use crate::error::{Error, Result};
use crate::utils::io;
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::Path;

/// Result of rewriting one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub replacements: usize,
}

/// A file whose content changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    /// Path relative to root.
    pub file: String,
    pub replacements: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RewriteReport {
    pub scanned: usize,
    pub updated: Vec<FileUpdate>,
    pub failures: Vec<Failure>,
}

impl RewriteReport {
    pub fn total_replacements(&self) -> usize {
        self.updated.iter().map(|u| u.replacements).sum()
    }

    /// Move reported paths to where a dry-run rename phase planned them, and
    /// restore the walk order a real run would have produced.
    pub(crate) fn relocate(&mut self, renames: &RenameReport) {
        for update in &mut self.updated {
            update.file = renames.renamed_path(&update.file);
        }
        for failure in &mut self.failures {
            failure.path = renames.renamed_path(&failure.path);
        }
        self.updated
            .sort_by(|a, b| Path::new(&a.file).cmp(Path::new(&b.file)));
    }
}

/// Text rewriter with the per-folder patterns compiled once.
pub struct ImportRewriter<'a> {
    config: &'a SuffixConfig,
    folder_patterns: Vec<Regex>,
}

impl<'a> ImportRewriter<'a> {
    pub fn new(config: &'a SuffixConfig) -> Result<Self> {
        let folder_patterns = config
            .folders
            .iter()
            .map(|mapping| {
                // quote, one or more ./ or ../ hops, folder, remainder, quote
                let pattern = format!(
                    r#"(['"])((?:\.\.?/)+{}/)([^'"\n]+)(['"])"#,
                    regex::escape(&mapping.to)
                );
                Regex::new(&pattern).map_err(|e| {
                    Error::internal_unexpected(format!(
                        "compile import pattern for '{}': {}",
                        mapping.to, e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ImportRewriter {
            config,
            folder_patterns,
        })
    }

    /// Apply all substitutions to `content`.
    pub fn rewrite(&self, content: &str) -> Rewrite {
        let mut text = content.to_string();
        let mut replacements = 0;

        for mapping in &self.config.folders {
            let forms = [
                (format!("/{}/", mapping.from), format!("/{}/", mapping.to)),
                (format!("'./{}'", mapping.from), format!("'./{}'", mapping.to)),
                (format!("\"./{}\"", mapping.from), format!("\"./{}\"", mapping.to)),
            ];
            for (old, new) in &forms {
                replacements += replace_literal(&mut text, old, new);
            }
        }

        for pattern in &self.folder_patterns {
            let mut count = 0;
            let replaced = pattern.replace_all(&text, |caps: &Captures| {
                match self.suffix_reference(&caps[3]) {
                    Some(rest) => {
                        count += 1;
                        format!("{}{}{}{}", &caps[1], &caps[2], rest, &caps[4])
                    }
                    None => caps[0].to_string(),
                }
            });
            if count > 0 {
                text = replaced.into_owned();
                replacements += count;
            }
        }

        for entry in &self.config.entry_points {
            let target = format!("{}{}", entry, self.config.suffix);
            for quote in ['\'', '"'] {
                let old = format!("{q}./{}{q}", entry, q = quote);
                let new = format!("{q}./{}{q}", target, q = quote);
                replacements += replace_literal(&mut text, &old, &new);
            }
        }

        Rewrite {
            content: text,
            replacements,
        }
    }

    /// Suffix the last path component of `rest`, or `None` to leave it as is.
    fn suffix_reference(&self, rest: &str) -> Option<String> {
        let (dir, name) = match rest.rfind('/') {
            Some(idx) => rest.split_at(idx + 1),
            None => ("", rest),
        };
        if name.is_empty() || name.contains(&self.config.suffix) {
            return None;
        }

        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let renamed = match ext.as_deref() {
            Some(ext) if self.config.is_asset(ext) || self.config.is_style(ext) => return None,
            Some(ext) if self.config.is_script(ext) => insert_suffix(name, &self.config.suffix),
            _ => format!("{}{}", name, self.config.suffix),
        };
        Some(format!("{}{}", dir, renamed))
    }
}

/// Replace every occurrence of `old` in `text`, returning the count.
fn replace_literal(text: &mut String, old: &str, new: &str) -> usize {
    let count = text.matches(old).count();
    if count > 0 {
        *text = text.replace(old, new);
    }
    count
}

/// Rewrite `content` with a one-off rewriter.
pub fn rewrite_content(content: &str, config: &SuffixConfig) -> Result<Rewrite> {
    Ok(ImportRewriter::new(config)?.rewrite(content))
}

/// Run the rewrite phase over every script and stylesheet under `root`.
///
/// Files are only written when their content changed.
pub fn rewrite_imports(
    root: &Path,
    config: &SuffixConfig,
    options: &RunOptions,
) -> Result<RewriteReport> {
    let rewriter = ImportRewriter::new(config)?;
    let mut report = RewriteReport::default();

    let keep = |entry: &Entry| {
        entry
            .extension()
            .is_some_and(|ext| config.is_script(&ext) || config.is_style(&ext))
    };
    let walked = walk::walk_files(root, &keep, options, &mut report.failures);
    let Some(files) = options.absorb(walked, walk::relative(root, root), &mut report.failures)?
    else {
        return Ok(report);
    };

    for path in files {
        let relative = walk::relative(&path, root);
        report.scanned += 1;

        let read = io::read_file(&path, &format!("read {}", relative));
        let Some(content) = options.absorb(read, relative.clone(), &mut report.failures)? else {
            continue;
        };

        let rewrite = rewriter.rewrite(&content);
        if rewrite.content == content {
            continue;
        }

        if options.dry_run {
            log_status!("resuffix", "Would update imports in: {}", relative);
        } else {
            let written = io::write_file_atomic(&path, &rewrite.content, &format!("write {}", relative));
            if options
                .absorb(written, relative.clone(), &mut report.failures)?
                .is_none()
            {
                continue;
            }
            log_status!("resuffix", "Updated imports in: {}", relative);
        }

        report.updated.push(FileUpdate {
            file: relative,
            replacements: rewrite.replacements,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rewrite(content: &str) -> String {
        rewrite_content(content, &SuffixConfig::default())
            .unwrap()
            .content
    }

    #[test]
    fn folder_and_filename_are_suffixed() {
        assert_eq!(
            rewrite(r#"import Foo from "../components/Foo";"#),
            r#"import Foo from "../components_beach/Foo_beach";"#
        );
    }

    #[test]
    fn asset_filename_is_not_suffixed() {
        let src = r#"import logo from "./components_beach/logo.png";"#;
        assert_eq!(rewrite(src), src);

        assert_eq!(
            rewrite("import icon from '../components/icon.svg';"),
            "import icon from '../components_beach/icon.svg';"
        );
    }

    #[test]
    fn helpers_import_and_sibling_asset() {
        let src = "import { fmt } from '../utils/helpers'\nimport logo from './logo.png'\n";
        assert_eq!(
            rewrite(src),
            "import { fmt } from '../utils_beach/helpers_beach'\nimport logo from './logo.png'\n"
        );
    }

    #[test]
    fn script_extension_gets_suffix_before_extension() {
        assert_eq!(
            rewrite("require('./db/index.js')"),
            "require('./db_beach/index_beach.js')"
        );
    }

    #[test]
    fn nested_paths_suffix_last_component() {
        assert_eq!(
            rewrite("import x from '../../hooks/score/useScore'"),
            "import x from '../../hooks_beach/score/useScore_beach'"
        );
    }

    #[test]
    fn stylesheets_under_renamed_folder_keep_their_name() {
        assert_eq!(
            rewrite("import './components/Card.css'"),
            "import './components_beach/Card.css'"
        );
    }

    #[test]
    fn styles_css_entry_is_renamed() {
        assert_eq!(
            rewrite("@import \"./styles.css\";"),
            "@import \"./styles_beach.css\";"
        );
    }

    #[test]
    fn bare_folder_import_is_renamed() {
        assert_eq!(
            rewrite("import * as db from './db'"),
            "import * as db from './db_beach'"
        );
    }

    #[test]
    fn entry_point_special_case() {
        assert_eq!(
            rewrite("import App from './App'\nimport Shell from './AppShell'"),
            "import App from './App_beach'\nimport Shell from './AppShell'"
        );
        assert_eq!(rewrite(r#"import("./App")"#), r#"import("./App_beach")"#);
    }

    #[test]
    fn unrecognized_import_forms_are_left_alone() {
        // Alias imports only get the folder segment; the filename needs a ./ hop.
        assert_eq!(
            rewrite("import Foo from '@/components/Foo'"),
            "import Foo from '@/components_beach/Foo'"
        );
        let src = "const s = `./utils/${name}`;";
        assert_eq!(rewrite(src), "const s = `./utils_beach/${name}`;");
    }

    #[test]
    fn rewriting_twice_is_a_no_op() {
        let src = "import Foo from '../components/Foo'\nimport App from './App'\n@import './styles.css';\n";
        let once = rewrite(src);
        let twice = rewrite(&once);
        assert_eq!(once, twice);
        let again = rewrite_content(&once, &SuffixConfig::default()).unwrap();
        assert_eq!(again.replacements, 0);
    }

    #[test]
    fn replacements_are_counted() {
        let result = rewrite_content(
            "import a from '../utils/a'\nimport b from '../utils/b'\n",
            &SuffixConfig::default(),
        )
        .unwrap();
        // two folder segments + two filenames
        assert_eq!(result.replacements, 4);
    }

    #[test]
    fn custom_suffix_is_used() {
        let config = SuffixConfig {
            suffix: "_fork".to_string(),
            folders: vec![crate::config::FolderMapping::with_suffix("lib", "_fork")],
            entry_points: Vec::new(),
            ..SuffixConfig::default()
        };
        let result = rewrite_content("import x from '../lib/api'", &config).unwrap();
        assert_eq!(result.content, "import x from '../lib_fork/api_fork'");
    }

    #[test]
    fn rewrite_imports_writes_only_changed_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("pages/Home.jsx"), "import B from '../components/B'\n").unwrap();
        fs::write(root.join("pages/plain.js"), "export const x = 1;\n").unwrap();
        fs::write(root.join("notes.md"), "see ../components/B\n").unwrap();

        let before = fs::metadata(root.join("pages/plain.js")).unwrap().modified().unwrap();
        let report = rewrite_imports(root, &SuffixConfig::default(), &RunOptions::default()).unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(
            report.updated,
            vec![FileUpdate {
                file: "pages/Home.jsx".to_string(),
                replacements: 2,
            }]
        );
        assert_eq!(
            fs::read_to_string(root.join("pages/Home.jsx")).unwrap(),
            "import B from '../components_beach/B_beach'\n"
        );
        assert_eq!(
            fs::metadata(root.join("pages/plain.js")).unwrap().modified().unwrap(),
            before
        );
        assert_eq!(
            fs::read_to_string(root.join("notes.md")).unwrap(),
            "see ../components/B\n"
        );
    }

    #[test]
    fn rewrite_imports_second_run_updates_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("main.jsx"), "import App from './App'\nimport './styles.css'\n").unwrap();

        let config = SuffixConfig::default();
        let first = rewrite_imports(root, &config, &RunOptions::default()).unwrap();
        assert_eq!(first.updated.len(), 1);
        let content = fs::read_to_string(root.join("main.jsx")).unwrap();

        let second = rewrite_imports(root, &config, &RunOptions::default()).unwrap();
        assert!(second.updated.is_empty());
        assert_eq!(fs::read_to_string(root.join("main.jsx")).unwrap(), content);
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.js"), "import x from './utils/x'\n").unwrap();

        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = rewrite_imports(root, &SuffixConfig::default(), &options).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(
            fs::read_to_string(root.join("a.js")).unwrap(),
            "import x from './utils/x'\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_script_is_updated_through_the_link() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(root.join("shared/real.js"), "import x from './utils/x'\n").unwrap();
        std::os::unix::fs::symlink("../shared/real.js", root.join("app/link.js")).unwrap();

        rewrite_imports(root, &SuffixConfig::default(), &RunOptions::default()).unwrap();

        let link = root.join("app/link.js");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(root.join("shared/real.js")).unwrap(),
            "import x from './utils_beach/x_beach'\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn executable_script_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let cli = root.join("cli.js");
        fs::write(&cli, "import run from './lib/run'\n").unwrap();
        fs::set_permissions(&cli, fs::Permissions::from_mode(0o755)).unwrap();

        let report = rewrite_imports(root, &SuffixConfig::default(), &RunOptions::default()).unwrap();

        assert_eq!(report.updated.len(), 1);
        assert_eq!(fs::metadata(&cli).unwrap().permissions().mode() & 0o777, 0o755);
    }

    #[test]
    fn non_utf8_file_aborts_or_is_recorded() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("bad.js"), [0xffu8, 0xfe, 0x80]).unwrap();
        fs::write(root.join("good.js"), "import x from './utils/x'\n").unwrap();
        let config = SuffixConfig::default();

        let err = rewrite_imports(root, &config, &RunOptions::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");

        let options = RunOptions {
            keep_going: true,
            ..Default::default()
        };
        let report = rewrite_imports(root, &config, &options).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "bad.js");
        assert_eq!(report.updated.len(), 1);
    }
}
