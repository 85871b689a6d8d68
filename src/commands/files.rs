use clap::Args;
use serde::Serialize;

use resuffix::suffix::{self, RenameReport};

use crate::commands::{exit_code_for_failures, CmdResult, TreeArgs};

#[derive(Args)]
pub struct FilesArgs {
    #[command(flatten)]
    pub tree: TreeArgs,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum FilesOutput {
    #[serde(rename = "files")]
    Files {
        root: String,
        dry_run: bool,
        total_renamed: usize,
        #[serde(flatten)]
        report: RenameReport,
    },
}

pub fn run(args: FilesArgs) -> CmdResult<FilesOutput> {
    let root = args.tree.root_path()?;
    let config = args.tree.config.resolve()?;
    let options = args.tree.options();

    let report = suffix::rename_files(&root, &config, &options)?;
    let exit_code = exit_code_for_failures(report.failures.len());

    Ok((
        FilesOutput::Files {
            root: root.display().to_string(),
            dry_run: options.dry_run,
            total_renamed: report.total_renamed(),
            report,
        },
        exit_code,
    ))
}
