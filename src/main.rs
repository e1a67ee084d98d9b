use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    ConfigCommand, Context, DataCommand, GoalsCommand, MealCommand, SummaryCommand,
    WeightCommand, WorkoutCommand,
};
use leanfit::{Config, Journal};

#[derive(Parser)]
#[command(name = "leanfit")]
#[command(version)]
#[command(about = "A nutrition and training journal", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and list meals
    Meal(MealCommand),

    /// Record and review weigh-ins
    Weight(WeightCommand),

    /// Log workouts and review lifts
    Workout(WorkoutCommand),

    /// Daily, weekly and streak summaries
    Summary(SummaryCommand),

    /// Set goals, calculate targets and track a plan
    Goals(GoalsCommand),

    /// Export or clear data
    Data(DataCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leanfit=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for config commands
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    match command {
        Commands::Config(cmd) => cmd.run(&config, cli_config_path),
        Commands::Meal(cmd) => cmd.run(&context(&config)?).await,
        Commands::Weight(cmd) => cmd.run(&context(&config)?).await,
        Commands::Workout(cmd) => cmd.run(&context(&config)?).await,
        Commands::Summary(cmd) => cmd.run(&context(&config)?).await,
        Commands::Goals(cmd) => cmd.run(&context(&config)?).await,
        Commands::Data(cmd) => cmd.run(&context(&config)?).await,
    }
}

fn context(config: &Config) -> Result<Context, Box<dyn std::error::Error>> {
    Ok(Context {
        journal: Journal::new(config.document_store()),
        user: config.cli_user()?,
        clock: config.clock(),
    })
}
