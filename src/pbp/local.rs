use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::models::PlayRecord;
use super::source::SeasonSource;
use super::{parse_season_bytes, season_file_name};

/// Season tables stored in a local directory as `play_by_play_{year}.csv.gz`
/// (or the uncompressed `play_by_play_{year}.csv`).
pub struct LocalFiles {
    data_dir: PathBuf,
}

impl LocalFiles {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        LocalFiles {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the file for a season, preferring the gzipped table.
    pub fn season_path(&self, season: u16) -> Option<PathBuf> {
        let gz = self.data_dir.join(season_file_name(season));
        if gz.is_file() {
            return Some(gz);
        }
        let plain = self.data_dir.join(format!("play_by_play_{}.csv", season));
        plain.is_file().then_some(plain)
    }
}

#[async_trait]
impl SeasonSource for LocalFiles {
    fn name(&self) -> &str {
        "local"
    }

    async fn load_season(&self, season: u16) -> Result<Vec<PlayRecord>> {
        let path = self.season_path(season).with_context(|| {
            format!(
                "No play-by-play file for {} in {} (run `fetch` first)",
                season,
                self.data_dir.display()
            )
        })?;
        debug!("Reading {}", path.display());

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        tokio::task::spawn_blocking(move || parse_season_bytes(&bytes))
            .await
            .context("Season parser task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nfl-comebacks-local-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_loads_plain_csv_season() {
        let dir = temp_dir("plain");
        std::fs::write(
            dir.join("play_by_play_2001.csv"),
            "game_id,qtr\n2001_01_A_B,1\n",
        )
        .unwrap();

        let src = LocalFiles::new(&dir);
        let plays = src.load_season(2001).await.unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].qtr, Some(1));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_season_is_an_error() {
        let dir = temp_dir("missing");
        let src = LocalFiles::new(&dir);
        let err = src.load_season(1985).await.unwrap_err();
        assert!(err.to_string().contains("1985"));
        std::fs::remove_dir_all(dir).ok();
    }
}
