use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::models::PlayRecord;
use super::source::SeasonSource;
use super::{parse_season_bytes, season_file_name};

pub const DEFAULT_BASE_URL: &str =
    "https://github.com/nflverse/nflverse-data/releases/download/pbp/";

/// Season tables downloaded from the nflverse-data GitHub release.
/// Docs: <https://github.com/nflverse/nflverse-data>
#[derive(Clone)]
pub struct Nflverse {
    http: Client,
    /// Base URL for overriding in tests
    base_url: Url,
    max_attempts: u32,
}

impl Nflverse {
    pub fn new(base_url: Option<&str>, max_attempts: u32) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;
        let mut raw = base_url.unwrap_or(DEFAULT_BASE_URL).to_string();
        // Url::join replaces the last path segment unless the base ends in '/'
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).with_context(|| format!("Invalid nflverse URL: {}", raw))?;
        Ok(Nflverse {
            http,
            base_url,
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn season_url(&self, season: u16) -> Result<Url> {
        self.base_url
            .join(&season_file_name(season))
            .context("Failed to build season URL")
    }

    /// Download the raw (gzipped) season table, retrying transport failures
    /// and 5xx responses with exponential backoff plus jitter.
    pub async fn download_season(&self, season: u16) -> Result<Vec<u8>> {
        let url = self.season_url(season)?;
        let mut backoff_ms = 500u64;
        let max_backoff_ms = 8_000u64;
        let mut attempt = 1;

        loop {
            debug!("Downloading {} (attempt {})", url, attempt);
            let err = match self.http.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let bytes = resp
                        .bytes()
                        .await
                        .with_context(|| format!("Failed to read body of {}", url))?;
                    return Ok(bytes.to_vec());
                }
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => {
                    anyhow::bail!("nflverse has no play-by-play table for {} ({})", season, url);
                }
                Ok(resp) if !resp.status().is_server_error() => {
                    anyhow::bail!("nflverse error {} for {}", resp.status(), url);
                }
                Ok(resp) => anyhow::anyhow!("nflverse error {}", resp.status()),
                Err(e) => anyhow::Error::new(e).context("nflverse request failed"),
            };

            if attempt >= self.max_attempts {
                return Err(err.context(format!("Giving up on {} after {} attempts", url, attempt)));
            }
            let jitter = rand::thread_rng().gen_range(0..=backoff_ms / 4);
            warn!(
                "Download of season {} failed ({:#}); retrying in {}ms",
                season,
                err,
                backoff_ms + jitter
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms + jitter)).await;
            backoff_ms = (backoff_ms * 2).min(max_backoff_ms);
            attempt += 1;
        }
    }

    /// Download season tables into `data_dir`, skipping files already present
    /// unless `overwrite` is set. Returns the number of files written.
    pub async fn fetch_to_dir(
        &self,
        data_dir: &Path,
        seasons: impl IntoIterator<Item = u16>,
        overwrite: bool,
    ) -> Result<usize> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let mut written = 0;
        for season in seasons {
            let path = data_dir.join(season_file_name(season));
            if !overwrite && path.is_file() {
                info!("Season {} already present at {}", season, path.display());
                continue;
            }
            let bytes = self.download_season(season).await?;
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Saved season {} ({:.1} MB) to {}",
                season,
                bytes.len() as f64 / 1_048_576.0,
                path.display()
            );
            written += 1;
        }
        Ok(written)
    }
}

#[async_trait]
impl SeasonSource for Nflverse {
    fn name(&self) -> &str {
        "nflverse"
    }

    async fn load_season(&self, season: u16) -> Result<Vec<PlayRecord>> {
        let bytes = self.download_season(season).await?;
        tokio::task::spawn_blocking(move || parse_season_bytes(&bytes))
            .await
            .context("Season parser task panicked")?
    }
}
