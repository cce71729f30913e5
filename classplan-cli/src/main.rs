use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod auth;
mod config;
mod dry_run;
mod google;
mod plan_cmds;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "classplan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CLASSPLAN_BUILD_SHA"), ")"),
    about = "Schedule Google Classroom coursework from a course plan"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the plan against Classroom/Drive and create every item as a scheduled draft
    Run {
        /// Plan file (.json or .toml)
        plan: PathBuf,

        /// Print the request payloads instead of creating anything
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// IANA timezone for naive plan dates (default: config.schedule.timezone)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Show the resolved publish/due dates without contacting Google
    Preview {
        plan: PathBuf,

        #[arg(long)]
        timezone: Option<String>,
    },

    /// Print the plan as JSON with every date made absolute
    Normalize {
        plan: PathBuf,

        #[arg(long)]
        timezone: Option<String>,
    },

    /// Run the Google OAuth flow and cache tokens under ~/.classplan
    Auth,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.classplan/config.toml
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            plan,
            dry_run,
            timezone,
        } => {
            plan_cmds::run(&plan, timezone.as_deref(), dry_run).await?;
        }

        Command::Preview { plan, timezone } => {
            plan_cmds::preview(&plan, timezone.as_deref())?;
        }

        Command::Normalize { plan, timezone } => {
            plan_cmds::normalize(&plan, timezone.as_deref())?;
        }

        Command::Auth => {
            let cfg = config::load_config()?;
            auth::connect_interactive(&cfg).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}
