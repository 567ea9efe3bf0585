use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use jobtrawl::server::{AppState, configure};
use jobtrawl::{HttpFetcher, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jobtrawl=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    let fetcher = HttpFetcher::new(settings.request_timeout)
        .context("Failed to build HTTP client")?
        .respect_robots(settings.respect_robots);

    let state = web::Data::new(AppState::new(Arc::new(fetcher), settings.run_options()));

    tracing::info!(
        addr = %settings.bind_addr,
        port = settings.port,
        output = %settings.output_path.display(),
        seen_ids = %settings.seen_ids_path.display(),
        "Starting jobtrawl"
    );
    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((settings.bind_addr.as_str(), settings.port))?
        .run()
        .await?;
    Ok(())
}
