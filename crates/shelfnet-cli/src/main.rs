//! shelfnet — genre co-occurrence networks over book shelves.

use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod workers;

use args::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = match args::parse(&argv) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    match command {
        Command::Build(options) => commands::build(&options).await,
        Command::Genres(options) => commands::genres(&options),
        Command::Help => {
            args::print_help();
            Ok(())
        }
    }
}
