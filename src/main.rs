//! Superinterface CLI binary entry point.

use superinterface::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let result = match commands::load_config(&cli) {
        Ok(config) => match &cli.command {
            Commands::Tts(args) => commands::handle_tts(&config, args).await,
            Commands::Decode => commands::handle_decode(&config).await,
            Commands::Filter => commands::handle_filter().await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
