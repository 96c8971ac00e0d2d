use crate::game::storage::{self, StorageError};
use crate::model::LeaderboardEntry;
use log::{info, warn};
use std::path::{Path, PathBuf};

const LEADERBOARD_FILE: &str = "leaderboard.json";
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn load() -> Self {
        Self::load_from(&storage::data_dir_or_fallback())
    }

    /// Missing or unreadable files give an empty board.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(LEADERBOARD_FILE);
        let mut entries = match storage::read_json::<Vec<LeaderboardEntry>>(&path) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(target: "leaderboard", "{}; starting with an empty leaderboard", err);
                Vec::new()
            }
        };
        sort_entries(&mut entries);
        entries.truncate(MAX_ENTRIES);
        Self { path, entries }
    }

    /// Adds a finished game. Returns its 1-based rank if it made the board.
    /// The board is left untouched when it cannot be written.
    pub fn record(&mut self, entry: LeaderboardEntry) -> Result<Option<usize>, StorageError> {
        let playthrough_id = entry.playthrough_id;
        let mut entries = self.entries.clone();
        entries.push(entry);
        sort_entries(&mut entries);
        entries.truncate(MAX_ENTRIES);

        storage::write_json(&self.path, &entries)?;
        self.entries = entries;

        let rank = self
            .entries
            .iter()
            .position(|e| e.playthrough_id == playthrough_id)
            .map(|index| index + 1);
        if let Some(rank) = rank {
            info!(target: "leaderboard", "New leaderboard entry at rank {}", rank);
        }
        Ok(rank)
    }

    pub fn high_score(&self) -> u64 {
        self.entries.first().map(|e| e.points).unwrap_or(0)
    }

    pub fn entries(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// most points first; earlier games win ties
fn sort_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::fs;
    use std::time::Duration;
    use uuid::Uuid;

    fn entry(points: u64, minutes_ago: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            points,
            level: Level::new(2),
            correct: 6,
            answered: 8,
            best_streak: 4,
            duration: Duration::from_secs(120),
            timestamp: Utc::now() - ChronoDuration::minutes(minutes_ago),
            playthrough_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_record_orders_and_ranks() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = Leaderboard::load_from(dir.path());
        assert!(board.is_empty());
        assert_eq!(board.high_score(), 0);

        assert_eq!(board.record(entry(50, 3)).unwrap(), Some(1));
        assert_eq!(board.record(entry(80, 2)).unwrap(), Some(1));
        assert_eq!(board.record(entry(50, 1)).unwrap(), Some(3));
        assert_eq!(board.high_score(), 80);

        let points: Vec<u64> = board.entries(10).iter().map(|e| e.points).collect();
        assert_eq!(points, vec![80, 50, 50]);
    }

    #[test]
    fn test_keeps_only_top_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = Leaderboard::load_from(dir.path());
        for points in 1..=MAX_ENTRIES as u64 {
            board.record(entry(points * 10, 0)).unwrap();
        }
        assert_eq!(board.record(entry(5, 0)).unwrap(), None);
        assert_eq!(board.len(), MAX_ENTRIES);
        assert_eq!(board.entries(3).len(), 3);
    }

    #[test]
    fn test_persists_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let recorded = entry(70, 0);
        Leaderboard::load_from(dir.path())
            .record(recorded.clone())
            .unwrap();

        let reloaded = Leaderboard::load_from(dir.path());
        assert_eq!(reloaded.entries(1), vec![recorded]);
    }

    #[test]
    fn test_failed_save_leaves_board_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = Leaderboard::load_from(dir.path());
        board.record(entry(40, 1)).unwrap();

        // a file where the board's directory should be
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "").unwrap();
        board.path = blocked.join(LEADERBOARD_FILE);

        assert!(board.record(entry(90, 0)).is_err());
        assert_eq!(board.len(), 1);
        assert_eq!(board.high_score(), 40);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LEADERBOARD_FILE), "[{\"points\": true}]").unwrap();
        assert!(Leaderboard::load_from(dir.path()).is_empty());
    }
}
