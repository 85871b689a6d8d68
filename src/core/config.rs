//! Suffix configuration: defaults, JSON config file, CLI overrides.
//!
//! Resolution order is defaults < config file < command-line flags. Each source
//! is a [`ConfigLayer`] of optional fields; [`SuffixConfig::resolve`] merges them
//! and validates the result.

use crate::error::{Error, Result};
use crate::utils::{io, validation};
use glob_match::glob_match;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SUFFIX: &str = "_beach";

/// Folders (and the one stylesheet) renamed by default.
const DEFAULT_FOLDERS: &[&str] = &[
    "components",
    "contexts",
    "hooks",
    "db",
    "utils",
    "lib",
    "i18n",
    "styles.css",
];

const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx"];
const DEFAULT_STYLE_EXTENSIONS: &[&str] = &["css"];
const DEFAULT_ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico"];
const DEFAULT_SKIP: &[&str] = &["main-beach", "App_beach"];
const DEFAULT_ENTRY_POINTS: &[&str] = &["App"];

/// One row of the folder-rename table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderMapping {
    pub from: String,
    pub to: String,
}

impl FolderMapping {
    /// Map `name` to its suffixed counterpart. Names with an extension
    /// (`styles.css`) get the suffix before the extension.
    pub fn with_suffix(name: &str, suffix: &str) -> Self {
        FolderMapping {
            from: name.to_string(),
            to: insert_suffix(name, suffix),
        }
    }
}

/// Folder entry as written in a config file or on the command line.
/// `to` is derived from the suffix when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl FolderEntry {
    /// Parse `OLD` or `OLD=NEW`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (from, to) = match spec.split_once('=') {
            Some((from, to)) => (from, Some(to)),
            None => (spec, None),
        };
        let from = validation::require_segment(from, "folder")?.to_string();
        let to = match to {
            Some(to) => Some(validation::require_segment(to, "folder")?.to_string()),
            None => None,
        };
        Ok(FolderEntry { from, to })
    }
}

/// Partial configuration from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<FolderEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_points: Option<Vec<String>>,
}

impl ConfigLayer {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, &format!("read config {}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
    }

    /// Fields set in `over` replace fields in `self`.
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            suffix: over.suffix.or(self.suffix),
            folders: over.folders.or(self.folders),
            script_extensions: over.script_extensions.or(self.script_extensions),
            style_extensions: over.style_extensions.or(self.style_extensions),
            asset_extensions: over.asset_extensions.or(self.asset_extensions),
            skip: over.skip.or(self.skip),
            entry_points: over.entry_points.or(self.entry_points),
        }
    }
}

/// Fully resolved configuration passed to both phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuffixConfig {
    pub suffix: String,
    pub folders: Vec<FolderMapping>,
    pub script_extensions: Vec<String>,
    pub style_extensions: Vec<String>,
    pub asset_extensions: Vec<String>,
    pub skip: Vec<String>,
    pub entry_points: Vec<String>,
}

impl Default for SuffixConfig {
    fn default() -> Self {
        SuffixConfig {
            suffix: DEFAULT_SUFFIX.to_string(),
            folders: DEFAULT_FOLDERS
                .iter()
                .map(|name| FolderMapping::with_suffix(name, DEFAULT_SUFFIX))
                .collect(),
            script_extensions: to_strings(DEFAULT_SCRIPT_EXTENSIONS),
            style_extensions: to_strings(DEFAULT_STYLE_EXTENSIONS),
            asset_extensions: to_strings(DEFAULT_ASSET_EXTENSIONS),
            skip: to_strings(DEFAULT_SKIP),
            entry_points: to_strings(DEFAULT_ENTRY_POINTS),
        }
    }
}

impl SuffixConfig {
    /// Merge layers (lowest precedence first) over the defaults and validate.
    pub fn resolve(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self> {
        let layer = layers
            .into_iter()
            .fold(ConfigLayer::default(), ConfigLayer::merge);
        let defaults = SuffixConfig::default();

        let suffix = match layer.suffix {
            Some(s) => validate_suffix(&s)?,
            None => defaults.suffix,
        };

        // Default folder targets follow the chosen suffix.
        let folders = match layer.folders {
            Some(entries) => entries,
            None => DEFAULT_FOLDERS
                .iter()
                .map(|name| FolderEntry {
                    from: name.to_string(),
                    to: None,
                })
                .collect(),
        };
        let folders = resolve_folders(folders, &suffix)?;

        let script_extensions = normalize_extensions(
            layer.script_extensions.unwrap_or(defaults.script_extensions),
            "script_extensions",
        )?;
        validation::require_non_empty_vec(
            &script_extensions,
            "script_extensions",
            "At least one script extension is required",
        )?;

        let style_extensions = normalize_extensions(
            layer.style_extensions.unwrap_or(defaults.style_extensions),
            "style_extensions",
        )?;
        let asset_extensions = normalize_extensions(
            layer.asset_extensions.unwrap_or(defaults.asset_extensions),
            "asset_extensions",
        )?;

        let skip = layer
            .skip
            .unwrap_or(defaults.skip)
            .iter()
            .map(|s| {
                validation::require_non_empty(s, "skip", "Skip pattern cannot be empty")
                    .map(str::to_string)
            })
            .collect::<Result<Vec<_>>>()?;

        let entry_points = layer
            .entry_points
            .unwrap_or(defaults.entry_points)
            .iter()
            .map(|s| validation::require_segment(s, "entry_points").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;

        Ok(SuffixConfig {
            suffix,
            folders,
            script_extensions,
            style_extensions,
            asset_extensions,
            skip,
            entry_points,
        })
    }

    pub fn is_script(&self, ext: &str) -> bool {
        contains_ext(&self.script_extensions, ext)
    }

    pub fn is_style(&self, ext: &str) -> bool {
        contains_ext(&self.style_extensions, ext)
    }

    pub fn is_asset(&self, ext: &str) -> bool {
        contains_ext(&self.asset_extensions, ext)
    }

    /// Whether a basename stem is on the skip list.
    pub fn is_skipped(&self, stem: &str) -> bool {
        self.skip.iter().any(|pattern| glob_match(pattern, stem))
    }

    /// Folder-table row whose `from` equals `name` exactly.
    pub fn folder_for(&self, name: &str) -> Option<&FolderMapping> {
        self.folders.iter().find(|f| f.from == name)
    }

    /// `Button.js` -> `Button_beach.js`.
    pub fn suffixed_name(&self, name: &str) -> String {
        insert_suffix(name, &self.suffix)
    }
}

/// Insert `suffix` before the last extension of `name`, or append it.
/// Leading dots (hidden files) are not treated as extension separators.
pub(crate) fn insert_suffix(name: &str, suffix: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}{}{}", &name[..idx], suffix, &name[idx..]),
        _ => format!("{}{}", name, suffix),
    }
}

fn validate_suffix(suffix: &str) -> Result<String> {
    if suffix.is_empty() {
        return Err(Error::config_invalid_value(
            "suffix",
            Some(suffix.to_string()),
            "Suffix cannot be empty",
        ));
    }
    if suffix.contains(['/', '\\', '.', '\'', '"']) || suffix.chars().any(char::is_whitespace) {
        return Err(Error::config_invalid_value(
            "suffix",
            Some(suffix.to_string()),
            "Suffix cannot contain path separators, dots, quotes or whitespace",
        ));
    }
    Ok(suffix.to_string())
}

fn resolve_folders(entries: Vec<FolderEntry>, suffix: &str) -> Result<Vec<FolderMapping>> {
    let mut folders: Vec<FolderMapping> = Vec::with_capacity(entries.len());
    for entry in entries {
        let from = validation::require_segment(&entry.from, "folders")?;
        let mapping = match entry.to {
            Some(to) => FolderMapping {
                from: from.to_string(),
                to: validation::require_segment(&to, "folders")?.to_string(),
            },
            None => FolderMapping::with_suffix(from, suffix),
        };
        if mapping.from == mapping.to {
            return Err(Error::config_invalid_value(
                "folders",
                Some(mapping.from),
                "Folder is mapped to itself",
            ));
        }
        if folders.iter().any(|f| f.from == mapping.from) {
            return Err(Error::config_invalid_value(
                "folders",
                Some(mapping.from),
                "Folder is listed more than once",
            ));
        }
        folders.push(mapping);
    }
    Ok(folders)
}

fn normalize_extensions(exts: Vec<String>, key: &str) -> Result<Vec<String>> {
    exts.into_iter()
        .map(|ext| {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                Err(Error::config_invalid_value(
                    key,
                    None,
                    "Extension cannot be empty",
                ))
            } else {
                Ok(ext)
            }
        })
        .collect()
}

fn contains_ext(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
