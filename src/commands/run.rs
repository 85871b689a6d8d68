use clap::Args;
use serde::Serialize;

use resuffix::suffix::{self, RunReport};

use crate::commands::{exit_code_for_failures, CmdResult, TreeArgs};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub tree: TreeArgs,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RunOutput {
    #[serde(rename = "run")]
    Run {
        root: String,
        suffix: String,
        total_renamed: usize,
        total_updated: usize,
        #[serde(flatten)]
        report: RunReport,
    },
}

pub fn run(args: RunArgs) -> CmdResult<RunOutput> {
    let root = args.tree.root_path()?;
    let config = args.tree.config.resolve()?;

    let report = suffix::run(&root, &config, &args.tree.options())?;
    let exit_code = exit_code_for_failures(report.failure_count());

    Ok((
        RunOutput::Run {
            root: root.display().to_string(),
            suffix: config.suffix,
            total_renamed: report.renames.total_renamed(),
            total_updated: report.imports.updated.len(),
            report,
        },
        exit_code,
    ))
}
