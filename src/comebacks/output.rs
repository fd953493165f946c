use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;

use super::models::ComebackRow;

/// Default file name of the flat comeback table inside the data directory.
pub const COMEBACKS_FILE: &str = "comebacks.csv";

pub fn write_comebacks<W: Write>(writer: W, rows: &[ComebackRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).context("Failed to serialize comeback row")?;
    }
    wtr.flush().context("Failed to flush comeback table")?;
    Ok(())
}

pub fn read_comebacks<R: Read>(reader: R) -> Result<Vec<ComebackRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize()
        .collect::<csv::Result<Vec<ComebackRow>>>()
        .context("Malformed comeback table")
}

pub fn save_comebacks(path: &Path, rows: &[ComebackRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_comebacks(std::io::BufWriter::new(file), rows)
}

pub fn load_comebacks(path: &Path) -> Result<Vec<ComebackRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {} (run `extract` first)", path.display()))?;
    read_comebacks(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row() -> ComebackRow {
        ComebackRow {
            year: 2022,
            game_id: "2022_15_IND_MIN".into(),
            play_id: Some(2100),
            home_team: Some("MIN".into()),
            away_team: Some("IND".into()),
            winner_team: Some("MIN".into()),
            game_date: NaiveDate::from_ymd_opt(2022, 12, 17),
            week: Some(15),
            season_type: Some("REG".into()),
            drive: Some(12),
            qtr: Some(2),
            down: None,
            ydstogo: Some(0),
            yrdln: Some("IND 15".into()),
            desc: Some("(Kick formation) M.Badgley extra point is GOOD, \"Center-L.Rhodes\"".into()),
            time: Some("0:00".into()),
            game_seconds_remaining: Some(1800.0),
            total_home_score: 0,
            total_away_score: 33,
            home_score: 39,
            away_score: 36,
            winner_wp: Some(0.004),
            max_future_deficit: 33,
            deficit_end: Some("13:34".into()),
            deficit_end_qtr: Some(3),
            deficit_end_seconds: Some(1886),
        }
    }

    #[test]
    fn test_table_keeps_absent_values_empty() {
        let mut last = row();
        last.deficit_end = None;
        last.deficit_end_qtr = None;
        last.deficit_end_seconds = None;

        let mut buf = Vec::new();
        write_comebacks(&mut buf, &[row(), last.clone()]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("year,game_id,play_id,"));
        assert!(text.lines().nth(2).unwrap().ends_with(",33,,,"));

        let back = read_comebacks(buf.as_slice()).unwrap();
        assert_eq!(back, vec![row(), last]);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("nfl-comebacks-out-{}", std::process::id()));
        let path = dir.join("nested").join(COMEBACKS_FILE);
        save_comebacks(&path, &[row()]).unwrap();
        assert_eq!(load_comebacks(&path).unwrap(), vec![row()]);
        std::fs::remove_dir_all(dir).ok();
    }
}
