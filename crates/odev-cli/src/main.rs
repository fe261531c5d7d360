use anyhow::Result;
use clap::Parser;
use odev_core::Reporter;

mod cli;
mod cli_params;
mod launch;
mod manifest;
mod negotiate;
mod odoo_args;
mod profiles_cmd;
mod provision;
mod reporter;
mod run_cmd;
mod run_request;
mod wizard;

#[cfg(test)]
mod test_support;

use cli::{Cli, Commands};
use odoo_args::Action;
use reporter::TerminalReporter;

#[tokio::main]
async fn main() {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let reporter = TerminalReporter::new();

    let exit_code = match dispatch(cli, &reporter).await {
        Ok(code) => code,
        Err(e) => {
            reporter.error(&format!("{e:#}"));
            1
        }
    };
    std::process::exit(exit_code);
}

async fn dispatch(cli: Cli, reporter: &dyn Reporter) -> Result<i32> {
    match cli.command {
        Commands::Start { run } => run_cmd::handle_run(Action::Run, run, reporter).await,
        Commands::Upgrade { run } => run_cmd::handle_run(Action::Upgrade, run, reporter).await,
        Commands::Test { run } => run_cmd::handle_run(Action::Test, run, reporter).await,
        Commands::Shell { run } => run_cmd::handle_run(Action::Shell, run, reporter).await,
        Commands::Translate {
            language,
            output,
            run,
        } => {
            let cwd = std::env::current_dir()?;
            let output = match output {
                Some(path) => odev_config::paths::resolve_against(&path, &cwd),
                None => cwd.join(format!("{language}.po")),
            };
            run_cmd::handle_run(Action::Translate { language, output }, run, reporter).await
        }
        Commands::Profiles => {
            profiles_cmd::handle_profiles(reporter)?;
            Ok(0)
        }
    }
}
