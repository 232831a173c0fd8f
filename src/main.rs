use anyhow::Result;
use clap::{Parser, Subcommand};
use navprofit::core::DEFAULT_CAPITAL;
use navprofit::core::config::AppConfig;
use navprofit::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Compute profit once and print it as JSON
    Profit {
        /// Mutual fund scheme code
        scheme_code: String,
        /// Purchase date (YYYY-MM-DD)
        start_date: String,
        /// Redemption date (YYYY-MM-DD)
        end_date: String,
        /// Invested amount
        #[arg(long, default_value_t = DEFAULT_CAPITAL)]
        capital: f64,
    },
}

impl From<Commands> for navprofit::AppCommand {
    fn from(cmd: Commands) -> navprofit::AppCommand {
        match cmd {
            Commands::Serve { host, port } => navprofit::AppCommand::Serve { host, port },
            Commands::Profit {
                scheme_code,
                start_date,
                end_date,
                capital,
            } => navprofit::AppCommand::Profit {
                scheme_code,
                start_date,
                end_date,
                capital,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });
    let result = match command {
        Commands::Setup => setup(),
        cmd => navprofit::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> Result<()> {
    use anyhow::Context;

    let path = AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, AppConfig::default().to_yaml()?)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
