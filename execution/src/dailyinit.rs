//! Daily-init persisted state: one whitespace-delimited file per strategy,
//! carrying overnight positions and the previous day's average spread ratio
//! across a process restart.
//!
//! Format (header row, then exactly one data row):
//! ```text
//! StrategyID 2day avgPx m_origbaseName1 m_origbaseName2 ytd1 ytd2
//! 92201 0 -24.441424 ag_F_2_SFE ag_F_4_SFE -2 2
//! ```
//!
//! Writers take an exclusive advisory lock via `fs4` and rewrite the file
//! atomically (truncate, write, release); readers never lock — a reader
//! racing a writer sees either the old or the new complete file, never a
//! partial one, because the writer only truncates after acquiring the lock.

use crate::error::ExecutionError;
use fs4::fs_std::FileExt;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "StrategyID 2day avgPx m_origbaseName1 m_origbaseName2 ytd1 ytd2";

/// One strategy's overnight state.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyInitRecord {
    pub strategy_id: i32,
    pub avg_spread_ratio: f64,
    pub instrument_name_1: String,
    pub instrument_name_2: String,
    pub overnight_position_1: i32,
    pub overnight_position_2: i32,
}

/// Returns the canonical path for a strategy's daily-init file under `data_dir`.
pub fn path_for(data_dir: &Path, strategy_id: i32) -> PathBuf {
    data_dir.join(format!("daily_init.{strategy_id}"))
}

/// Writes `record` to its daily-init file, replacing any existing content.
///
/// Acquires an exclusive advisory lock on the file for the duration of the
/// write so concurrent writers (there should only ever be one per strategy,
/// but a crashed-and-restarted process could race a still-running one)
/// cannot interleave partial writes.
pub fn write(data_dir: &Path, record: &DailyInitRecord) -> Result<(), ExecutionError> {
    let path = path_for(data_dir, record.strategy_id);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&path)?;

    file.lock_exclusive()
        .map_err(|e| ExecutionError::Io(format!("failed to lock {}: {e}", path.display())))?;

    let result = (|| -> Result<(), ExecutionError> {
        let mut file = &file;
        file.set_len(0)?;
        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(0))?;
        writeln!(file, "{HEADER}")?;
        writeln!(
            file,
            "{} 0 {} {} {} {} {}",
            record.strategy_id,
            record.avg_spread_ratio,
            record.instrument_name_1,
            record.instrument_name_2,
            record.overnight_position_1,
            record.overnight_position_2,
        )?;
        file.flush()?;
        Ok(())
    })();

    let _ = file.unlock();
    result
}

/// Reads a strategy's daily-init file. Does not take a lock; a reader that
/// races a writer observes either the previous or the new complete file.
pub fn read(data_dir: &Path, strategy_id: i32) -> Result<DailyInitRecord, ExecutionError> {
    let path = path_for(data_dir, strategy_id);
    let mut contents = String::new();
    std::fs::File::open(&path)?.read_to_string(&mut contents)?;

    let mut lines = contents.lines();
    lines.next().ok_or_else(|| {
        ExecutionError::Io(format!("{} is missing its header row", path.display()))
    })?;
    let data_line = lines.next().ok_or_else(|| {
        ExecutionError::Io(format!("{} is missing its data row", path.display()))
    })?;

    let fields: Vec<&str> = data_line.split_whitespace().collect();
    if fields.len() != 7 {
        return Err(ExecutionError::Io(format!(
            "{} data row has {} fields, expected 7",
            path.display(),
            fields.len()
        )));
    }

    let parse_err = |field: &str| ExecutionError::Io(format!("malformed field: {field}"));

    Ok(DailyInitRecord {
        strategy_id: fields[0].parse().map_err(|_| parse_err(fields[0]))?,
        // fields[1] is the reserved "2day" column, always 0.
        avg_spread_ratio: fields[2].parse().map_err(|_| parse_err(fields[2]))?,
        instrument_name_1: fields[3].to_string(),
        instrument_name_2: fields[4].to_string(),
        overnight_position_1: fields[5].parse().map_err(|_| parse_err(fields[5]))?,
        overnight_position_2: fields[6].parse().map_err(|_| parse_err(fields[6]))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_sample_record() {
        let dir = tempfile::tempdir().unwrap();
        let record = DailyInitRecord {
            strategy_id: 92201,
            avg_spread_ratio: -24.441424,
            instrument_name_1: "ag_F_2_SFE".into(),
            instrument_name_2: "ag_F_4_SFE".into(),
            overnight_position_1: -2,
            overnight_position_2: 2,
        };

        write(dir.path(), &record).unwrap();
        let read_back = read(dir.path(), 92201).unwrap();

        assert_eq!(read_back, record);
    }

    #[test]
    fn header_line_matches_spec() {
        let dir = tempfile::tempdir().unwrap();
        let record = DailyInitRecord {
            strategy_id: 1,
            avg_spread_ratio: 0.0,
            instrument_name_1: "A".into(),
            instrument_name_2: "B".into(),
            overnight_position_1: 0,
            overnight_position_2: 0,
        };
        write(dir.path(), &record).unwrap();

        let contents = std::fs::read_to_string(path_for(dir.path(), 1)).unwrap();
        assert_eq!(contents.lines().next().unwrap(), HEADER);
    }

    #[test]
    fn overwrite_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = DailyInitRecord {
            strategy_id: 7,
            avg_spread_ratio: 1.0,
            instrument_name_1: "X".into(),
            instrument_name_2: "Y".into(),
            overnight_position_1: 1,
            overnight_position_2: -1,
        };
        write(dir.path(), &record).unwrap();
        record.overnight_position_1 = 5;
        write(dir.path(), &record).unwrap();

        let read_back = read(dir.path(), 7).unwrap();
        assert_eq!(read_back.overnight_position_1, 5);
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(dir.path(), 404).is_err());
    }
}
