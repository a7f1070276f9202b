use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zonetune-cli", version, about = "Zonetune CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Heart-rate zone table
    Zones {
        #[command(subcommand)]
        action: commands::zones::ZonesAction,
    },
    /// Run a synthetic session against the real decision core
    Simulate(commands::simulate::SimulateArgs),
    /// Settings file management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Zones { action } => commands::zones::run(action),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
