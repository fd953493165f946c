pub mod local;
pub mod models;
pub mod nflverse;
pub mod source;

pub use local::LocalFiles;
pub use models::PlayRecord;
pub use nflverse::Nflverse;
pub use source::SeasonSource;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// File name nflverse uses for a season table.
pub fn season_file_name(season: u16) -> String {
    format!("play_by_play_{}.csv.gz", season)
}

/// Parse a season table from CSV bytes, transparently gunzipping when the
/// payload starts with the gzip magic number.
pub fn parse_season_bytes(bytes: &[u8]) -> Result<Vec<PlayRecord>> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        read_season_table(MultiGzDecoder::new(bytes))
    } else {
        read_season_table(bytes)
    }
}

/// Parse a play-by-play CSV table. Rows keep their file order, which is the
/// chronological order within each game.
pub fn read_season_table<R: Read>(reader: R) -> Result<Vec<PlayRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut plays = Vec::new();
    for (i, row) in rdr.deserialize::<PlayRecord>().enumerate() {
        // +2: header line plus 1-based numbering
        let play = row.with_context(|| format!("Malformed play-by-play row at line {}", i + 2))?;
        plays.push(play);
    }
    Ok(plays)
}
