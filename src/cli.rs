// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf, process::ExitCode};

use crate::core::config::RunOverrides;
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang="))
        .map(str::to_string)
}

fn build_cli(locale: &str) -> Command {
    Command::new("agent-test-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd.run_about", locale = locale).to_string())
                .arg(
                    Arg::new("tests-path")
                        .short('t')
                        .long("tests-path")
                        .help(t!("arg.tests_path", locale = locale).to_string())
                        .value_name("FILE")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("results-path")
                        .short('o')
                        .long("results-path")
                        .help(t!("arg.results_path", locale = locale).to_string())
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help(t!("arg.verbose", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("max-turns")
                        .long("max-turns")
                        .help(t!("arg.max_turns", locale = locale).to_string())
                        .value_name("TURNS")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("screenshots")
                        .long("screenshots")
                        .help(t!("arg.screenshots", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("agent")
                        .short('a')
                        .long("agent")
                        .help(t!("arg.agent", locale = locale).to_string())
                        .value_name("COMMAND")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("arg.jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("timeout-secs")
                        .long("timeout-secs")
                        .help(t!("arg.timeout_secs", locale = locale).to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg.config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd.init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg.output", locale = locale).to_string())
                        .value_name("FILE")
                        .default_value("tests.json")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help(t!("arg.force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg.non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn run_overrides(matches: &ArgMatches) -> RunOverrides {
    RunOverrides {
        tests_path: matches
            .get_one::<PathBuf>("tests-path")
            .cloned()
            .unwrap_or_default(),
        results_path: matches.get_one::<PathBuf>("results-path").cloned(),
        verbose: matches.get_flag("verbose"),
        max_turns: matches.get_one::<u32>("max-turns").copied(),
        screenshots: matches.get_flag("screenshots"),
        agent_command: matches.get_one::<String>("agent").cloned(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        timeout_secs: matches.get_one::<u64>("timeout-secs").copied(),
    }
}

/// Parses the command line and dispatches to the selected command.
/// Returns the process exit code: failure when any test case did not pass.
pub async fn run() -> Result<ExitCode> {
    // Pre-parse language and initialize i18n first.
    let requested_language = pre_parse_language();
    let language = crate::init(requested_language.as_deref());

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let config = run_matches.get_one::<PathBuf>("config").cloned();
            let all_passed = commands::run::execute(
                run_overrides(run_matches),
                config,
                requested_language.is_some(),
            )
            .await?;
            Ok(if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("tests.json"));
            let force = init_matches.get_flag("force");
            let non_interactive = init_matches.get_flag("non-interactive");

            // Show language detection message if it was auto-detected
            if requested_language.is_none() {
                println!("🌐 {}", t!("system_language_detected", lang = &language));
            }
            commands::init::execute(output, force, non_interactive)?;
            Ok(ExitCode::SUCCESS)
        }
        // `subcommand_required` makes clap exit before we get here.
        _ => Ok(ExitCode::FAILURE),
    }
}
