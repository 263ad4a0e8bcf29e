use clap::Parser;
use colored::Colorize;

use linkhub::cli::{Cli, Commands};
use linkhub::runtime::modes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    linkhub::config::init_config_from(&cli.config);

    let config = linkhub::config::get_config();
    let _log_guard = linkhub::system::init_logging(&config.logging);

    match cli.command {
        None | Some(Commands::Serve) => modes::run_server().await,
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                eprintln!("{}", "Run with --help for usage".dimmed());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
