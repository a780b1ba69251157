use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use mailsweep::{
    MailsweepConfig, SweepRunner, config::ConfigError, mailstore::GmailMailStore,
    observability::init_tracing, scheduler::FileTriggerStore,
};

const DEFAULT_CONFIG: &str = r#"# mailsweep configuration

[mailstore]
# base_url = "https://gmail.googleapis.com/gmail/v1"
bearer_token = "${GMAIL_ACCESS_TOKEN}"

[sweeps]
dry_run = false
page_size = 200
continuation_delay_secs = 120
interval_days = 1
purge_after_days = 365
archive_after_days = 90

[observability.logging]
level = "info"
format = "pretty"
"#;

#[derive(Parser, Debug)]
#[command(version, about = "Mailbox lifecycle sweeps: archive and purge old threads", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (defaults to ~/.config/mailsweep/mailsweep.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log and schedule as usual but skip every mutation call
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run one full sweep now (purge, then archive)
    Run,
    /// Fire any due triggers; intended to be driven by cron
    Tick,
    /// Install the periodic sweep trigger
    Install,
    /// Remove every trigger owned by mailsweep
    Uninstall,
    /// Write a default configuration file
    Init {
        /// Path to create the config file (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Tracing may not be initialized yet when config loading fails,
            // so always report on stderr as well.
            tracing::error!(error = %e, "mailsweep failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Command::Init { output, force } = &args.command {
        return write_default_config(output.clone(), *force);
    }

    let config_path = resolve_config_path(args.config)?;
    let mut config = MailsweepConfig::from_file(&config_path)?;
    if args.dry_run {
        config.sweeps.dry_run = true;
    }

    init_tracing(&config.observability.logging);
    tracing::debug!(config_path = %config_path.display(), "Loaded configuration");

    let scheduler = Arc::new(FileTriggerStore::new(config.scheduler.resolve_state_dir()));
    let store = Arc::new(GmailMailStore::new(&config.mailstore)?);
    let runner = SweepRunner::new(store, scheduler, config.sweeps.clone());

    match args.command {
        Command::Run => {
            runner.run_scheduled_sweep().await?;
        }
        Command::Tick => {
            let fired = runner.tick().await?;
            if fired == 0 {
                tracing::debug!("No due triggers");
            }
        }
        Command::Install => {
            runner.install().await?;
        }
        Command::Uninstall => {
            runner.uninstall().await?;
        }
        Command::Init { .. } => {}
    }

    Ok(())
}

fn resolve_config_path(
    explicit: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let path = MailsweepConfig::default_path()
        .ok_or_else(|| ConfigError::Validation("could not determine the config directory".into()))?;
    if !path.exists() {
        return Err(Box::new(ConfigError::Validation(format!(
            "no config file at {}; run `mailsweep init` to create one",
            path.display()
        ))));
    }
    Ok(path)
}

fn write_default_config(
    output: Option<PathBuf>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = match output {
        Some(path) => path,
        None => MailsweepConfig::default_path().ok_or_else(|| {
            ConfigError::Validation("could not determine the config directory".into())
        })?,
    };

    if path.exists() && !force {
        return Err(Box::new(ConfigError::Validation(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        ))));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
