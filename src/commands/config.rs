use clap::Args;
use serde::Serialize;

use resuffix::config::SuffixConfig;

use crate::commands::{CmdResult, SuffixConfigArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub config: SuffixConfigArgs,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConfigOutput {
    #[serde(rename = "config")]
    Show {
        #[serde(flatten)]
        config: SuffixConfig,
    },
}

/// Print the effective configuration after defaults, file and flags are merged.
pub fn run(args: ConfigArgs) -> CmdResult<ConfigOutput> {
    let config = args.config.resolve()?;
    Ok((ConfigOutput::Show { config }, 0))
}
