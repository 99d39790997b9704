//! `abx` - experiment administration from the terminal.
//!
//! Logging: set `RUST_LOG=abx=debug` (or pass `--verbose`) to see request
//! and allocation logs on stderr.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use abx_console::{commands, slider_console, ConsoleConfig, ConsoleContext};

use crate::cli::{Cli, Command, VariantAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "abx=debug,abx_console=debug,abx_allocator=debug,abx_results=debug"
        } else {
            "abx=info,abx_console=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(server) = cli.server.clone() {
        config.server.base_url = server;
    }
    tracing::debug!(server = %config.server.base_url, "configuration resolved");

    let ctx = ConsoleContext::new(config)?;

    let output = match cli.command {
        Command::List {
            search,
            page,
            page_size,
        } => commands::list(&ctx, search, page, page_size).await?,
        Command::Show { id } => commands::show(&ctx, &id).await?,
        Command::Create {
            id,
            name,
            description,
        } => commands::create(&ctx, &id, name, description).await?,
        Command::Enable { id } => commands::set_enabled(&ctx, &id, true).await?,
        Command::Disable { id } => commands::set_enabled(&ctx, &id, false).await?,
        Command::Delete { id } => commands::delete(&ctx, &id).await?,
        Command::Results { id, chart } => commands::results(&ctx, &id, chart).await?,
        Command::Variants { id, action } => match action {
            VariantAction::Add => commands::add_variant(&ctx, &id).await?,
            VariantAction::Remove { variant_id } => {
                commands::remove_variant(&ctx, &id, &variant_id).await?
            }
            VariantAction::Set { positions } => commands::set_traffic(&ctx, &id, positions).await?,
        },
        Command::Edit { id } => {
            slider_console::run_slider_console(&ctx, &id).await?;
            String::new()
        }
        Command::Export { kind, out } => commands::export(&ctx, kind, out.as_deref()).await?,
        Command::Import { kind, file } => commands::import(&ctx, kind, &file).await?,
    };

    print!("{output}");
    Ok(())
}
