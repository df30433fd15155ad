//! phone-scout: entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use phone_scout::Source;
use phone_scout_cli::{commands, load_config};

#[derive(Parser)]
#[command(
    name = "phone-scout",
    about = "Collect phone listings from Amazon and Flipkart and merge them per model",
    version
)]
struct Cli {
    /// Path to a phone-scout.json config file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every catalog model and write raw and combined artifacts (default).
    Run {
        /// Collect only this source (amazon, flipkart); skips the merge.
        #[arg(long)]
        source: Option<Source>,

        /// Disable pacing between requests.
        #[arg(long)]
        no_delay: bool,

        /// Override the output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Merge previously saved per-source artifacts.
    Merge {
        /// Amazon artifact (defaults to <output_dir>/raw/amazon_data.json).
        #[arg(long)]
        amazon: Option<PathBuf>,

        /// Flipkart artifact (defaults to <output_dir>/raw/flipkart_data.json).
        #[arg(long)]
        flipkart: Option<PathBuf>,

        /// Combined JSON output path; the CSV table is written alongside.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List catalog models and the sources that will search them.
    Catalog {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Run {
        source: None,
        no_delay: false,
        output_dir: None,
    });

    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "phone-scout", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;

    match command {
        Commands::Run {
            source,
            no_delay,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            commands::run(&config, source, no_delay).await?;
        }
        Commands::Merge {
            amazon,
            flipkart,
            output,
        } => {
            commands::merge(
                &config,
                amazon.as_deref(),
                flipkart.as_deref(),
                output.as_deref(),
            )?;
        }
        Commands::Catalog { json } => commands::catalog(&config, json)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
