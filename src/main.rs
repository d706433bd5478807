//! Nook CLI - per-project LXD development containers

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nook::cli::{Args, SubCommand};
use nook::config::{ConfigLayout, Settings};
use nook::engine::{ExecutionContext, Orchestrator, Outcome, ProvisionOptions};
use nook::prompt::TerminalPrompter;
use nook::runtime::{LxdClient, SystemLauncher};
use nook::{format_report, OutputFormat};

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "nook=debug" } else { "nook=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<i32> {
    if let Some(SubCommand::Unknown(argv)) = &args.command {
        let op = argv.first().map(String::as_str).unwrap_or_default();
        println!("unknown operation '{}' (see 'nook --help')", op);
        return Ok(0);
    }

    let home = dirs::home_dir();
    let root = args
        .config_dir
        .clone()
        .unwrap_or_else(|| ConfigLayout::default_root(home.as_deref()));
    let layout = ConfigLayout::new(root);
    let settings = Settings::load(&layout.settings_file())?;
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;

    let ctx = ExecutionContext {
        editor: settings.editor_command(),
        layout,
        settings,
        cwd,
        home,
    };
    let api = LxdClient::new(ctx.settings.socket_path());
    let launcher = SystemLauncher;
    let orchestrator = Orchestrator::new(&ctx, &api, &launcher);
    let explicit = args.container.as_deref();

    let outcome = match &args.command {
        None | Some(SubCommand::Login) => orchestrator.login(explicit)?,
        Some(SubCommand::Init { .. }) => {
            orchestrator.init(args.init_name(), &TerminalPrompter::new())?
        }
        Some(SubCommand::Provision { login }) => {
            orchestrator.provision(explicit, ProvisionOptions { login: *login })?
        }
        Some(SubCommand::Stop) => orchestrator.stop(explicit)?,
        Some(SubCommand::Status) => orchestrator.status(explicit)?,
        Some(SubCommand::List) => orchestrator.list()?,
        Some(SubCommand::Unknown(_)) => return Ok(0),
    };

    Ok(report(outcome, &ctx.cwd, OutputFormat::from_json_flag(args.json)))
}

/// Print what the user needs to see and pick the exit code
fn report(outcome: Outcome, cwd: &Path, format: OutputFormat) -> i32 {
    match outcome {
        Outcome::Completed => 0,
        Outcome::NoContainer => {
            println!(
                "No container found for {}. Run `nook init` here or pass --container NAME.",
                cwd.display()
            );
            0
        }
        Outcome::Cancelled => {
            println!("Cancelled.");
            0
        }
        Outcome::Session(exit) => exit.code.unwrap_or(1),
        Outcome::Report(report) => {
            println!("{}", format_report(&report, &format));
            0
        }
    }
}
