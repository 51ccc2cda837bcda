use std::io;
use std::process::ExitCode;
use sweep_launcher::cli::{self, Invocation};
use sweep_launcher::{commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();

    if let Err(e) = logging::init(cli::log_format(&matches)) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "sweep-launcher failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match cli::invocation(matches)? {
        Invocation::Launch(args) => {
            commands::launch(&args, &mut out).await?;
        }
        Invocation::Plan { config, json } => {
            commands::plan(config.as_deref(), json, &mut out)?;
        }
        Invocation::Artifacts { json } => commands::artifacts(json, &mut out)?,
    }
    Ok(())
}
