use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use dotsetup::cleanup::{CleanupPolicy, StdinConfirm};
use dotsetup::cli::{Cli, Commands, PackageAction};
use dotsetup::output::{self, Console, Verbosity};
use dotsetup::sync::{Direction, SyncError};
use dotsetup::{SetupContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "DOTSETUP_LOG";

fn main() {
    init_tracing();

    if let Err(e) = run() {
        match e.downcast_ref::<SyncError>() {
            Some(sync_err @ SyncError::ConfigCorrupt { reason, .. }) => {
                println!("{} {sync_err}", "E:".red().bold());
                tracing::debug!(reason = %reason, "configuration failed to load");
            }
            _ => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        output::set_verbosity(Verbosity::Verbose);
    } else if cli.quiet {
        output::set_verbosity(Verbosity::Quiet);
    }

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = SetupContext::new()?;
    ctx.dry_run = cli.dry_run;

    let mut console = Console;
    let mut prompt = StdinConfirm;

    match cli.command {
        Commands::Init {
            backups,
            dir,
            enable_new,
        } => {
            commands::init::execute(&mut ctx, &backups, dir.as_deref(), enable_new, &mut prompt)?;
        }
        Commands::Backup { copy, enable_new } => {
            commands::sync::execute(
                &ctx,
                Direction::Backup,
                copy,
                enable_new,
                &mut prompt,
                &mut console,
            )?;
        }
        Commands::Restore { copy, enable_new } => {
            commands::sync::execute(
                &ctx,
                Direction::Restore,
                copy,
                enable_new,
                &mut prompt,
                &mut console,
            )?;
        }
        Commands::Status => commands::status::execute(&ctx)?,
        Commands::Cleanup { untracked, confirm } => {
            let policy = CleanupPolicy { untracked, confirm };
            commands::cleanup::execute(&ctx, policy, &mut prompt, &mut console)?;
        }
        Commands::Package { action } => match action {
            PackageAction::Add { names } => {
                commands::package::add(&ctx, &names)?;
            }
            PackageAction::Remove { names } => {
                commands::package::remove(&ctx, &names)?;
            }
            PackageAction::List => commands::package::list(&ctx)?,
        },
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => commands::config::execute(&mut ctx, key.as_deref(), value, unset, list)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
