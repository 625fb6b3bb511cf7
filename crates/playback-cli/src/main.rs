use anyhow::Result;
use clap::{Parser, Subcommand};

mod generate;
mod protocol;
mod session;

/// Playback CLI - generates/validates scripts and drives sessions headlessly
#[derive(Parser)]
#[command(name = "playback")]
#[command(about = "CLI for the playback core: script generation, validation, headless sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a script from a course content database and print it as JSON
    Generate {
        /// Path to the course content SQLite database
        #[arg(long)]
        db: String,
        #[arg(long)]
        course_code: String,
        #[arg(long)]
        start_seed: u32,
        #[arg(long)]
        end_seed: u32,
    },
    /// Generate a script and print its validation report
    Validate {
        #[arg(long)]
        db: String,
        #[arg(long)]
        course_code: String,
        #[arg(long)]
        start_seed: u32,
        #[arg(long)]
        end_seed: u32,
    },
    /// Drive a session headlessly against a running `playback-server`,
    /// reading commands as JSON lines from stdin and printing session events
    Session {
        /// Base WebSocket URL, e.g. ws://127.0.0.1:3000
        #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            db,
            course_code,
            start_seed,
            end_seed,
        } => generate::generate(&db, &course_code, start_seed, end_seed).await?,
        Commands::Validate {
            db,
            course_code,
            start_seed,
            end_seed,
        } => generate::validate(&db, &course_code, start_seed, end_seed).await?,
        Commands::Session { server } => session::run(&server).await?,
    }

    Ok(())
}
