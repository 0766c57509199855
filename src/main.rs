use clap::Parser;
use colored::Colorize;

use roomdream::cli::{Cli, Commands};
use roomdream::config::{get_config, init_config_from};
use roomdream::runtime::modes;
use roomdream::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref());

    match cli.command {
        None | Some(Commands::Serve) => {
            let _guard = init_logging(&get_config());
            modes::run_server().await
        }
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
