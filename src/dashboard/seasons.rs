use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::info;

use crate::pbp::{PlayRecord, SeasonSource};

type Plays = Arc<Vec<PlayRecord>>;

#[derive(Default)]
struct Slots {
    /// Most recently used last
    loaded: VecDeque<(u16, Plays)>,
    /// Loads in flight; concurrent requests for one season share a cell
    pending: HashMap<u16, Arc<OnceCell<Plays>>>,
}

/// Season tables loaded on demand for the drive chart, keeping the most
/// recently used `capacity` seasons in memory.
pub struct SeasonCache {
    source: Arc<dyn SeasonSource>,
    capacity: usize,
    slots: Mutex<Slots>,
}

impl SeasonCache {
    pub fn new(source: Arc<dyn SeasonSource>, capacity: usize) -> Self {
        SeasonCache {
            source,
            capacity: capacity.max(1),
            slots: Mutex::new(Slots::default()),
        }
    }

    pub async fn get(&self, season: u16) -> Result<Plays> {
        let cell = {
            let mut slots = self.slots.lock().await;
            if let Some(pos) = slots.loaded.iter().position(|(s, _)| *s == season) {
                if let Some(entry) = slots.loaded.remove(pos) {
                    let plays = Arc::clone(&entry.1);
                    slots.loaded.push_back(entry);
                    return Ok(plays);
                }
            }
            Arc::clone(slots.pending.entry(season).or_default())
        };

        // Load without holding the lock
        let plays = cell
            .get_or_try_init(|| async {
                let plays = Arc::new(self.source.load_season(season).await?);
                info!(
                    "Loaded season {} from {} ({} plays)",
                    season,
                    self.source.name(),
                    plays.len()
                );
                Ok::<_, anyhow::Error>(plays)
            })
            .await?;
        let plays = Arc::clone(plays);

        let mut slots = self.slots.lock().await;
        if slots
            .pending
            .get(&season)
            .is_some_and(|p| Arc::ptr_eq(p, &cell))
        {
            slots.pending.remove(&season);
        }
        if !slots.loaded.iter().any(|(s, _)| *s == season) {
            slots.loaded.push_back((season, Arc::clone(&plays)));
            while slots.loaded.len() > self.capacity {
                slots.loaded.pop_front();
            }
        }
        Ok(plays)
    }
}
