mod args;
mod config;
mod global;
mod handlers;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use args::{ListCommand, ListsArgs, QueryArgs, RecordCommand};
use global::GlobalArgs;

#[derive(Parser)]
#[command(name = "tilepack")]
#[command(version)]
#[command(about = "Encode, decode and inspect tile records and lists", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Binary records
    #[command(subcommand)]
    Record(RecordCommand),

    /// Delimited lists
    #[command(subcommand)]
    List(ListCommand),

    /// Show the configured lists
    Lists(ListsArgs),

    /// Send a query to the configured endpoint
    Query(QueryArgs),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global.log_level);

    let config = config::load(&cli.global)?;

    match cli.command {
        Commands::Record(RecordCommand::Encode(args)) => handlers::record::encode(args),
        Commands::Record(RecordCommand::Decode(args)) => handlers::record::decode(args),
        Commands::List(command) => handlers::list::handle(command, &config),
        Commands::Lists(args) => handlers::lists::handle(args, &config),
        Commands::Query(args) => handlers::query::handle(args, &config),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
