//! Presentation-layer filters for the comeback explorer.
//!
//! The comeback table is loaded once and never mutated; every slider change
//! re-runs [`apply_filter`] and the result is memoised by filter parameters.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use crate::comebacks::{format_game_time, ComebackRow};

/// Default "hope level": comebacks of more than two scores.
pub const DEFAULT_MIN_DEFICIT: i32 = 17;

const MAX_CACHED_FILTERS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ComebackFilter {
    /// Minimum deficit overcome
    #[serde(default = "default_min_deficit")]
    pub min_deficit: i32,
    /// Minimum game time (seconds since kickoff) at which the deficit ended
    #[serde(default)]
    pub min_game_seconds: u32,
    #[serde(default)]
    pub include_postseason: bool,
    /// Ceiling on the winner's win probability at the checkpoint play
    #[serde(default)]
    pub max_win_prob: Option<f64>,
}

fn default_min_deficit() -> i32 {
    DEFAULT_MIN_DEFICIT
}

impl Default for ComebackFilter {
    fn default() -> Self {
        ComebackFilter {
            min_deficit: DEFAULT_MIN_DEFICIT,
            min_game_seconds: 0,
            include_postseason: false,
            max_win_prob: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FilterKey {
    min_deficit: i32,
    min_game_seconds: u32,
    include_postseason: bool,
    max_win_prob_bits: Option<u64>,
}

impl ComebackFilter {
    fn key(&self) -> FilterKey {
        FilterKey {
            min_deficit: self.min_deficit,
            min_game_seconds: self.min_game_seconds,
            include_postseason: self.include_postseason,
            max_win_prob_bits: self.max_win_prob.map(f64::to_bits),
        }
    }

    pub fn matches(&self, row: &ComebackRow) -> bool {
        if row.max_future_deficit < self.min_deficit {
            return false;
        }
        match row.deficit_end_seconds {
            Some(s) if s >= self.min_game_seconds => {}
            _ => return false,
        }
        if !self.include_postseason && !row.is_regular_season() {
            return false;
        }
        match (self.max_win_prob, row.winner_wp) {
            (None, _) => true,
            (Some(ceiling), Some(wp)) => wp <= ceiling,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    pub filter: ComebackFilter,
    pub rows: Vec<ComebackRow>,
    /// Distinct games among the matching rows
    pub games: usize,
    pub seasons: usize,
    /// Matching games per season
    pub rate: f64,
    pub level: &'static str,
    /// Caption for `min_game_seconds`, e.g. "Q3 10:00"
    pub game_time: String,
}

/// Caption for how often comebacks of a given scale happen.
pub fn comeback_level(rate: f64) -> &'static str {
    if rate > 16.0 {
        "Come on, we see these like, once a week."
    } else if rate > 8.0 {
        "Yeah, could happen."
    } else if rate > 4.0 {
        "There's a few every season..."
    } else if rate > 2.0 {
        "There's a *very* few every season..."
    } else if rate > 1.0 {
        "There's like, one or two every season."
    } else if rate > 0.5 {
        "Maybe next season..."
    } else if rate > 0.2 {
        "If successful, this game will get its own Wikipedia page."
    } else if rate > 0.0 {
        "Might as well get some lottery tickets..."
    } else {
        "UNPRECEDENTED!"
    }
}

/// Number of distinct seasons in the table (at least 1).
pub fn season_count(rows: &[ComebackRow]) -> usize {
    rows.iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .len()
        .max(1)
}

pub fn apply_filter(rows: &[ComebackRow], seasons: usize, filter: ComebackFilter) -> FilterResult {
    let matching: Vec<ComebackRow> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();
    let games = matching
        .iter()
        .map(|r| r.game_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let seasons = seasons.max(1);
    let rate = games as f64 / seasons as f64;
    FilterResult {
        filter,
        rows: matching,
        games,
        seasons,
        rate,
        level: comeback_level(rate),
        game_time: format_game_time(filter.min_game_seconds),
    }
}

/// Immutable comeback table plus a memo of filter results.
pub struct ComebackExplorer {
    rows: Arc<Vec<ComebackRow>>,
    seasons: usize,
    cache: Mutex<HashMap<FilterKey, Arc<FilterResult>>>,
}

impl ComebackExplorer {
    pub fn new(rows: Vec<ComebackRow>) -> Self {
        let seasons = season_count(&rows);
        ComebackExplorer {
            rows: Arc::new(rows),
            seasons,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn seasons(&self) -> usize {
        self.seasons
    }

    pub fn query(&self, filter: ComebackFilter) -> Arc<FilterResult> {
        let key = filter.key();
        if let Some(hit) = self.lock_cache().get(&key) {
            return Arc::clone(hit);
        }

        let result = Arc::new(apply_filter(&self.rows, self.seasons, filter));
        let mut cache = self.lock_cache();
        if cache.len() >= MAX_CACHED_FILTERS {
            cache.clear();
        }
        cache.insert(key, Arc::clone(&result));
        result
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<FilterKey, Arc<FilterResult>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
