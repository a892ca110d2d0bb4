//! Atelier - offline tools for decal designs: export, inspect, optimize

use std::process::ExitCode;

use atelier_ipc::ExportKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Args, Command};
use commands::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match real_main(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn real_main(args: Args) -> Result<(), CliError> {
    let config = commands::load_config(args.config.as_deref(), args.product.as_deref())?;
    info!("Using product {}", config.active_product);

    match args.command {
        Command::Export {
            design,
            out,
            thumbnail,
            images_root,
        } => {
            let kind = if thumbnail {
                ExportKind::Thumbnail
            } else {
                ExportKind::PrintFile
            };
            let summary =
                commands::export(config, &design, &out, kind, images_root.as_deref()).await?;
            println!("{}", summary);
        }
        Command::Inspect { design } => {
            for line in commands::inspect(config, &design).await? {
                println!("{}", line);
            }
        }
        Command::Optimize { input, out } => {
            commands::optimize(config, &input, &out).await?;
        }
    }
    Ok(())
}
