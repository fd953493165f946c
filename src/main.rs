use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod comebacks;
mod config;
mod dashboard;
mod drive_chart;
mod pbp;

use config::{Command, Config};
use dashboard::filters::ComebackExplorer;
use dashboard::seasons::SeasonCache;
use dashboard::AppState;
use pbp::{LocalFiles, Nflverse, SeasonSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let source: Arc<dyn SeasonSource> = if config.remote {
        Arc::new(Nflverse::new(
            Some(config.nflverse_url.as_str()),
            config.download_attempts,
        )?)
    } else {
        Arc::new(LocalFiles::new(&config.data_dir))
    };

    match &config.command {
        Command::Extract { .. } => {
            let rows =
                comebacks::extract_seasons(source.as_ref(), config.seasons(), config.game_clock())
                    .await?;
            let path = config.comebacks_path();
            comebacks::save_comebacks(&path, &rows)?;
            info!("Saved comeback data to {}", path.display());
        }
        Command::Fetch { overwrite } => {
            let nflverse = Nflverse::new(Some(config.nflverse_url.as_str()), config.download_attempts)?;
            let written = nflverse
                .fetch_to_dir(&config.data_dir, config.seasons(), *overwrite)
                .await?;
            info!(
                "Fetched {} season file(s) into {}",
                written,
                config.data_dir.display()
            );
        }
        Command::Serve {
            dashboard_addr,
            cached_seasons,
        } => {
            let path = config.comebacks_path();
            let rows = comebacks::load_comebacks(&path)?;
            info!("Loaded {} comeback checkpoints from {}", rows.len(), path.display());

            let state = AppState {
                explorer: Arc::new(ComebackExplorer::new(rows)),
                seasons: Arc::new(SeasonCache::new(source, *cached_seasons)),
                season_range: config.seasons(),
            };
            let app = dashboard::router(state);
            let addr: SocketAddr = dashboard_addr.parse()?;
            info!("Dashboard listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;

            // Run dashboard server (blocks until shutdown)
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
