mod commands;
mod logging;
mod style;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tsu_config::{DbConfig, UploadConfig};

use crate::commands::upload::UploadArgs;
use crate::logging::Logging;

#[derive(Parser)]
#[command(name = "tsu")]
#[command(about = "Tournament score uploader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read player rows, validate them and replace the stored snapshot
    Upload {
        /// Validate and preview only; the store is not modified
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Fail instead of clearing the store when no valid player remains
        #[arg(long, default_value_t = false)]
        refuse_empty: bool,
    },

    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Connectivity, schema presence and stored player count
    Status,

    /// Apply SQL migrations
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::dotenv();

    let (log_dir, log_style) = tsu_config::log_settings_from_env();
    let _logging = match Logging::init(&log_dir, log_style) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("CRITICAL: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("CRITICAL: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.cmd {
        Commands::Upload {
            dry_run,
            refuse_empty,
        } => {
            let cfg = UploadConfig::from_env()?;
            let styler = style::styler_for(cfg.log_style);
            commands::upload::run(
                &cfg,
                UploadArgs {
                    dry_run,
                    refuse_empty,
                },
                styler.as_ref(),
            )
            .await
        }

        Commands::Db { cmd } => {
            let cfg = DbConfig::from_env()?;
            match cmd {
                DbCmd::Status => commands::db::status(&cfg).await,
                DbCmd::Migrate => commands::db::migrate(&cfg).await,
            }
        }
    }
}
