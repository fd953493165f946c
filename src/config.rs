use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::comebacks::{GameClock, COMEBACKS_FILE};
use crate::pbp::nflverse::DEFAULT_BASE_URL;

/// First season with nflverse play-by-play data.
pub const FIRST_SEASON: u16 = 1999;

/// NFL comeback extraction and dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "nfl-comebacks", version, about)]
pub struct Config {
    /// Directory holding play_by_play_{year}.csv.gz files and comebacks.csv
    #[arg(long, env = "DATA_DIR", default_value = "./data", global = true)]
    pub data_dir: PathBuf,

    /// First season to process
    #[arg(long, env = "BEGIN_YEAR", default_value = "1999", global = true)]
    pub begin_year: u16,

    /// Last season to process (inclusive)
    #[arg(long, env = "END_YEAR", default_value = "2023", global = true)]
    pub end_year: u16,

    /// Read seasons straight from nflverse instead of the data directory
    #[arg(long, env = "REMOTE", default_value = "false", global = true)]
    pub remote: bool,

    /// nflverse play-by-play release URL
    #[arg(long, env = "NFLVERSE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub nflverse_url: String,

    /// Attempts per season download before giving up
    #[arg(long, env = "DOWNLOAD_ATTEMPTS", default_value = "3", global = true)]
    pub download_attempts: u32,

    /// Comeback table path (defaults to <data_dir>/comebacks.csv)
    #[arg(long, env = "COMEBACKS_PATH", global = true)]
    pub comebacks_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract comeback checkpoints from every season into the comeback table
    Extract {
        /// Overtime period length in seconds (defaults to the 900 s regulation period)
        #[arg(long, env = "OVERTIME_SECONDS")]
        overtime_seconds: Option<u32>,
    },
    /// Download season tables from nflverse into the data directory
    Fetch {
        /// Re-download seasons that are already present
        #[arg(long, default_value = "false")]
        overwrite: bool,
    },
    /// Serve the comeback explorer and drive chart dashboard
    Serve {
        /// Dashboard listen address
        #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8501")]
        dashboard_addr: String,

        /// Season tables kept in memory for the drive chart
        #[arg(long, env = "CACHED_SEASONS", default_value = "3")]
        cached_seasons: usize,
    },
}

impl Config {
    pub fn seasons(&self) -> RangeInclusive<u16> {
        self.begin_year..=self.end_year
    }

    pub fn comebacks_path(&self) -> PathBuf {
        self.comebacks_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(COMEBACKS_FILE))
    }

    pub fn game_clock(&self) -> GameClock {
        match &self.command {
            Command::Extract { overtime_seconds } => GameClock::with_overtime(*overtime_seconds),
            _ => GameClock::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let current_year = chrono::Utc::now().year();
        if self.begin_year < FIRST_SEASON {
            anyhow::bail!("begin_year must be {} or later", FIRST_SEASON);
        }
        if i32::from(self.end_year) > current_year {
            anyhow::bail!("end_year must not be after {}", current_year);
        }
        if self.begin_year > self.end_year {
            anyhow::bail!("begin_year must not be after end_year");
        }
        if self.download_attempts == 0 {
            anyhow::bail!("download_attempts must be at least 1");
        }
        match &self.command {
            Command::Extract {
                overtime_seconds: Some(0),
            } => anyhow::bail!("overtime_seconds must be positive"),
            Command::Serve {
                dashboard_addr,
                cached_seasons,
            } => {
                if dashboard_addr.parse::<SocketAddr>().is_err() {
                    anyhow::bail!("dashboard_addr is not a valid socket address: {}", dashboard_addr);
                }
                if *cached_seasons == 0 {
                    anyhow::bail!("cached_seasons must be at least 1");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
