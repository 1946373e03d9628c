//! Application entry point for bond-news-watch.
//!
//! Initializes all components and starts the news polling loop.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use bond_news_watch::config::Config;
use bond_news_watch::delivery::dispatcher::DeliveryDispatcher;
use bond_news_watch::delivery::log_notifier::LogNotifier;
use bond_news_watch::feed::extractor::Extractor;
use bond_news_watch::feed::nsd_source::NsdSource;
use bond_news_watch::logging::setup_logging;
use bond_news_watch::repository::Repository;
use bond_news_watch::service::Services;
use bond_news_watch::service::ingestion_service::IngestionLimits;
use bond_news_watch::task::news_check_task::NewsCheckTask;
use dotenv::dotenv;
use log::debug;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;

    let db = setup_database(&config, init_start).await?;
    let services = setup_services(&config, db)?;
    let task = setup_task(&config, services, init_start);

    run(init_start).await?;
    task.stop();
    Ok(())
}

fn load_config() -> Result<Arc<Config>> {
    debug!("Loading configuration...");
    let mut config = Config::new();
    config.load()?;
    let config = Arc::new(config);
    setup_logging(&config)?;
    info!("Starting bond-news-watch...");
    Ok(config)
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Repository...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

fn setup_services(config: &Config, db: Arc<Repository>) -> Result<Arc<Services>> {
    debug!("Setting up Services...");
    let source = Arc::new(NsdSource::new(&config.news)?);
    Ok(Arc::new(Services::new(
        db,
        source,
        Extractor::default(),
        IngestionLimits::from(&config.news),
    )))
}

fn setup_task(config: &Config, services: Arc<Services>, init_start: Instant) -> Arc<NewsCheckTask> {
    debug!("Setting up NewsCheckTask...");
    let (dispatcher, _worker) =
        DeliveryDispatcher::start(Arc::new(LogNotifier::new()), config.delivery_interval);

    let task = NewsCheckTask::new(
        services,
        Arc::new(dispatcher),
        config.poll_interval,
        config.initial_delay,
    );
    task.clone().start();

    info!(
        "Task setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    task
}

async fn run(init_start: Instant) -> Result<()> {
    info!(
        "bond-news-watch is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");

    Ok(())
}
