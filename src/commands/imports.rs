use clap::Args;
use serde::Serialize;

use resuffix::suffix::{self, RewriteReport};

use crate::commands::{exit_code_for_failures, CmdResult, TreeArgs};

#[derive(Args)]
pub struct ImportsArgs {
    #[command(flatten)]
    pub tree: TreeArgs,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ImportsOutput {
    #[serde(rename = "imports")]
    Imports {
        root: String,
        dry_run: bool,
        total_replacements: usize,
        #[serde(flatten)]
        report: RewriteReport,
    },
}

pub fn run(args: ImportsArgs) -> CmdResult<ImportsOutput> {
    let root = args.tree.root_path()?;
    let config = args.tree.config.resolve()?;
    let options = args.tree.options();

    let report = suffix::rewrite_imports(&root, &config, &options)?;
    let exit_code = exit_code_for_failures(report.failures.len());

    Ok((
        ImportsOutput::Imports {
            root: root.display().to_string(),
            dry_run: options.dry_run,
            total_replacements: report.total_replacements(),
            report,
        },
        exit_code,
    ))
}
