use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{config, files, imports, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "resuffix")]
#[command(version = VERSION)]
#[command(about = "Suffix script/style basenames and retarget imports in a frontend tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename files, then rewrite imports
    Run(run::RunArgs),
    /// Rename table folders and suffix script basenames only
    Files(files::FilesArgs),
    /// Rewrite import paths only
    Imports(imports::ImportsArgs),
    /// Show the effective configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("resuffix: {}", err.summary());
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "resuffix",
            "run",
            "./src",
            "--suffix",
            "_fork",
            "--folder",
            "components",
            "--folder",
            "lib=lib_x",
            "--skip",
            "main-*",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.tree.root, "./src");
        assert_eq!(args.tree.config.suffix.as_deref(), Some("_fork"));
        assert_eq!(args.tree.config.folders, vec!["components", "lib=lib_x"]);
        assert_eq!(args.tree.config.skip, vec!["main-*"]);
        assert!(args.tree.dry_run);
        assert!(!args.tree.keep_going);
    }

    #[test]
    fn root_is_required() {
        assert!(Cli::try_parse_from(["resuffix", "run"]).is_err());
        assert!(Cli::try_parse_from(["resuffix", "config"]).is_ok());
    }

    #[test]
    fn run_json_reports_missing_root() {
        let cli = Cli::try_parse_from(["resuffix", "imports", "/nonexistent/resuffix"]).unwrap();
        let (result, code) = commands::run_json(cli.command);
        assert_eq!(code, 4);
        assert_eq!(result.unwrap_err().code.as_str(), "root.not_found");
    }

    #[test]
    fn run_json_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("components")).unwrap();
        std::fs::write(
            root.join("components/Button.js"),
            "import { cx } from '../utils/helpers'\n",
        )
        .unwrap();

        let root_arg = root.display().to_string();
        let cli = Cli::try_parse_from(["resuffix", "run", root_arg.as_str()]).unwrap();
        let (result, code) = commands::run_json(cli.command);

        assert_eq!(code, 0);
        let value = result.unwrap();
        assert_eq!(value["command"], "run");
        assert_eq!(value["suffix"], "_beach");
        assert_eq!(value["total_renamed"], 2);
        assert_eq!(value["total_updated"], 1);
        assert!(root.join("components_beach/Button_beach.js").exists());
    }

    #[test]
    fn exit_code_is_clamped() {
        assert_eq!(exit_code_to_u8(-1), 0);
        assert_eq!(exit_code_to_u8(3), 3);
        assert_eq!(exit_code_to_u8(1000), 255);
    }
}
