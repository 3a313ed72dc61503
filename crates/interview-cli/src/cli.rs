use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Error, Result};
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::cmd::{
    self, records::RecordsArgs, run::ResumeArgs, run::RunArgs, validate::ValidateArgs,
};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "interview",
    about = "Play server-driven interviews in the terminal",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Session configuration file (TOML)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interview from an initial state response
    Run(RunArgs),
    /// Continue an interview from a saved record
    Resume(ResumeArgs),
    /// Validate answers against field schemas without a server
    Validate(ValidateArgs),
    /// List saved interview records
    Records(RecordsArgs),
}

pub fn main() -> Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    cmd::i18n::init(cmd::i18n::cli_locale_from_argv(&argv));

    let mut command = localize_help(Cli::command(), true);
    let matches = match command.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|err| Error::msg(err.to_string()))?;
    cmd::i18n::init(cli.locale.clone());
    logging::init(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => cmd::run::run(args, config),
        Commands::Resume(args) => cmd::run::resume(args, config),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Records(args) => cmd::records::run(args, config),
    }
}

fn localize_help(mut command: clap::Command, is_root: bool) -> clap::Command {
    if let Some(about) = command.get_about().map(|s| s.to_string()) {
        command = command.about(cmd::i18n::tr_lit(&about));
    }
    if let Some(long_about) = command.get_long_about().map(|s| s.to_string()) {
        command = command.long_about(cmd::i18n::tr_lit(&long_about));
    }

    command = command
        .disable_help_subcommand(true)
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help(cmd::i18n::tr_lit("Print help")),
        );
    if is_root {
        command = command.disable_version_flag(true).arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::Version)
                .help(cmd::i18n::tr_lit("Print version")),
        );
    }

    let arg_ids = command
        .get_arguments()
        .map(|arg| arg.get_id().clone())
        .collect::<Vec<_>>();
    for arg_id in arg_ids {
        command = command.mut_arg(arg_id, |arg| {
            let mut arg = arg;
            if let Some(help) = arg.get_help().map(ToString::to_string) {
                arg = arg.help(cmd::i18n::tr_lit(&help));
            }
            arg
        });
    }

    let sub_names = command
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect::<Vec<_>>();
    for name in sub_names {
        command = command.mut_subcommand(name, |sub| localize_help(sub, false));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "interview",
            "--locale",
            "nl",
            "-vv",
            "run",
            "start.json",
            "--base-url",
            "https://example.com/api/",
            "--meta",
            "source=cli",
            "--meta",
            "attempt=2",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.locale.as_deref(), Some("nl"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.response, "start.json");
                assert_eq!(
                    args.session.base_url.as_deref(),
                    Some("https://example.com/api/")
                );
                assert_eq!(args.meta, vec!["source=cli", "attempt=2"]);
            }
            _ => panic!("expected run args"),
        }
    }

    #[test]
    fn parses_validate_command() {
        let cli = Cli::try_parse_from([
            "interview",
            "validate",
            "--fields",
            "fields.json",
            "--values",
            "values.json",
            "--json",
            "--config",
            "session.toml",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.config, Some(PathBuf::from("session.toml")));
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.fields, PathBuf::from("fields.json"));
                assert_eq!(args.values, Some(PathBuf::from("values.json")));
                assert!(args.json);
            }
            _ => panic!("expected validate args"),
        }
    }

    #[test]
    fn parses_resume_and_records() {
        let cli = Cli::try_parse_from(["interview", "resume", "abc", "--storage-dir", "/tmp/s"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Resume(args) => {
                assert_eq!(args.id, "abc");
                assert_eq!(args.session.storage_dir, Some(PathBuf::from("/tmp/s")));
            }
            _ => panic!("expected resume args"),
        }

        let cli = Cli::try_parse_from(["interview", "records", "--json"])
            .expect("expected CLI to parse");
        assert!(matches!(cli.command, Commands::Records(args) if args.json));
    }

    #[test]
    fn localized_help_keeps_structure() {
        let command = localize_help(Cli::command(), true);
        command.clone().debug_assert();
        assert!(command.get_subcommands().any(|sub| sub.get_name() == "validate"));
    }
}
