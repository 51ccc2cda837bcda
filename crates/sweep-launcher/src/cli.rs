//! Argument parsing

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use sweep_core::{ModeKind, Strictness, SweepConfig};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Options of the `launch` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    pub config: Option<PathBuf>,
    pub mode: Option<ModeKind>,
    pub workers: Option<usize>,
    pub spool: Option<PathBuf>,
    pub dry_run: bool,
    pub strict: bool,
}

impl LaunchArgs {
    /// Apply command line overrides on top of a loaded config
    #[must_use]
    pub fn apply(&self, mut config: SweepConfig) -> SweepConfig {
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(spool) = &self.spool {
            config.submission.spool_dir.clone_from(spool);
        }
        if self.strict {
            config = config.with_strictness(Strictness::Deny);
        }
        config
    }
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Launch(LaunchArgs),
    Plan { config: Option<PathBuf>, json: bool },
    Artifacts { json: bool },
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Sweep config file (TOML); defaults to the stock SPEC experiment")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

#[must_use]
pub fn build_cli() -> Command {
    Command::new("sweep-launcher")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Submit gem5 SPEC experiment matrices to a task queue")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format; filter with RUST_LOG"),
        )
        .subcommand(
            Command::new("launch")
                .about("Enumerate the matrix and submit one job per point")
                .arg(config_arg())
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["fire-and-forget", "bounded-pool"])
                        .help("Submission mode (overrides the config file)"),
                )
                .arg(
                    Arg::new("workers")
                        .long("workers")
                        .value_parser(value_parser!(usize))
                        .help("Worker count for bounded-pool mode"),
                )
                .arg(
                    Arg::new("spool")
                        .long("spool")
                        .value_parser(value_parser!(PathBuf))
                        .help("Spool directory the external runner reads"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Record jobs in memory instead of spooling them"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail if a CPU model has no workload sizes"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the experiment matrix without submitting")
                .arg(config_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("artifacts")
                .about("Print the registered build artifacts")
                .arg(json_arg()),
        )
}

/// Log format selected on the command line
#[must_use]
pub fn log_format(matches: &ArgMatches) -> LogFormat {
    let matches = matches.subcommand().map_or(matches, |(_, sub)| sub);
    match matches.get_one::<String>("log-format").map(String::as_str) {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Turn matches from [`build_cli`] into an [`Invocation`]
///
/// # Errors
/// Returns error for a subcommand this parser does not know
pub fn invocation(matches: &ArgMatches) -> anyhow::Result<Invocation> {
    match matches.subcommand() {
        Some(("launch", args)) => {
            let mode = args
                .get_one::<String>("mode")
                .map(|m| m.parse::<ModeKind>())
                .transpose()?;
            Ok(Invocation::Launch(LaunchArgs {
                config: args.get_one::<PathBuf>("config").cloned(),
                mode,
                workers: args.get_one::<usize>("workers").copied(),
                spool: args.get_one::<PathBuf>("spool").cloned(),
                dry_run: args.get_flag("dry-run"),
                strict: args.get_flag("strict"),
            }))
        }
        Some(("plan", args)) => Ok(Invocation::Plan {
            config: args.get_one::<PathBuf>("config").cloned(),
            json: args.get_flag("json"),
        }),
        Some(("artifacts", args)) => Ok(Invocation::Artifacts {
            json: args.get_flag("json"),
        }),
        other => anyhow::bail!("unknown command: {:?}", other.map(|(name, _)| name)),
    }
}
