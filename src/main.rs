use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use runnel::app::AppContext;
use runnel::cli::{commands, Cli, Commands};
use runnel::config::Config;
use runnel::store::FeedStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.update.workers = workers;
    }

    let ctx = AppContext::new(config, cli.state)?;
    let mut store = FeedStore::open(&ctx.store_path, ctx.updater.parser().cache().clone())?;

    match cli.command {
        Commands::Add { url, nickname, access } => {
            let credentials = access.credentials();
            commands::add_feed(&ctx, &mut store, &url, nickname, access.insecure, credentials).await?;
            store.save()?;
        }
        Commands::Remove { url } => {
            commands::remove_feed(&mut store, &url)?;
            store.save()?;
        }
        Commands::Update { new } => {
            if new {
                commands::print_new_items(&ctx, &mut store).await?;
            } else {
                commands::update_feeds(&ctx, &mut store).await?;
            }
            store.save()?;
        }
        Commands::List { items } => {
            if items {
                commands::list_items(&store);
            } else {
                commands::list_feeds(&store);
            }
        }
        Commands::Fetch { url, access } => {
            commands::fetch_once(&ctx, &url, access.insecure, &access.credentials()).await?;
        }
        Commands::Parse { path } => {
            commands::parse_file(&ctx, &path)?;
        }
    }

    Ok(())
}
