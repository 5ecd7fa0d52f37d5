//! Scores of every player as last reported by the relay.
//!
//! The score channel's receive task writes here while the UI loop reads a
//! snapshot every frame, so all access goes through one mutex.

use shared::ScoreUpdate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    scores: Arc<Mutex<HashMap<String, u32>>>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a relay update; the latest score for a name wins.
    pub fn apply(&self, update: ScoreUpdate) {
        let (name, score) = update.into_parts();
        self.lock().insert(name, score);
    }

    pub fn record(&self, name: impl Into<String>, score: u32) {
        self.lock().insert(name.into(), score);
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.lock().get(name).copied()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consistent copy of all entries, ordered by player name.
    pub fn snapshot(&self) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self
            .lock()
            .iter()
            .map(|(name, score)| (name.clone(), *score))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    // A panicking writer cannot leave a HashMap insert half done, so keep going.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.scores.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_apply_and_overwrite() {
        let leaderboard = Leaderboard::new();
        leaderboard.apply(ScoreUpdate::new("player1", 1).unwrap());
        leaderboard.apply(ScoreUpdate::new("player2", 4).unwrap());
        leaderboard.apply(ScoreUpdate::new("player1", 2).unwrap());

        assert_eq!(leaderboard.len(), 2);
        assert_eq!(leaderboard.get("player1"), Some(2));
        assert_eq!(leaderboard.get("player2"), Some(4));
        assert_eq!(leaderboard.get("player3"), None);
    }

    #[test]
    fn test_snapshot_sorted_by_name() {
        let leaderboard = Leaderboard::new();
        leaderboard.record("carol", 1);
        leaderboard.record("alice", 7);
        leaderboard.record("bob", 3);

        assert_eq!(
            leaderboard.snapshot(),
            vec![
                ("alice".to_string(), 7),
                ("bob".to_string(), 3),
                ("carol".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_clear() {
        let leaderboard = Leaderboard::new();
        leaderboard.record("player1", 5);
        let shared = leaderboard.clone();

        shared.clear();

        assert!(leaderboard.is_empty());
        assert!(leaderboard.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_writers_and_reader() {
        const DISTINCT: usize = 16;
        const REPEATS: u32 = 200;

        let leaderboard = Leaderboard::new();

        let reader = {
            let leaderboard = leaderboard.clone();
            thread::spawn(move || {
                let mut last_len = 0;
                for _ in 0..500 {
                    let snapshot = leaderboard.snapshot();
                    assert!(snapshot.len() >= last_len, "entries disappeared");
                    assert!(snapshot.len() <= DISTINCT + 1);
                    last_len = snapshot.len();
                }
            })
        };

        let mut writers: Vec<_> = (0..DISTINCT)
            .map(|i| {
                let leaderboard = leaderboard.clone();
                thread::spawn(move || {
                    leaderboard.apply(ScoreUpdate::new(format!("player{}", i), i as u32).unwrap());
                })
            })
            .collect();

        writers.push({
            let leaderboard = leaderboard.clone();
            thread::spawn(move || {
                for score in 1..=REPEATS {
                    leaderboard.apply(ScoreUpdate::new("repeat", score).unwrap());
                }
            })
        });

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        let snapshot = leaderboard.snapshot();
        assert_eq!(snapshot.len(), DISTINCT + 1);
        assert_eq!(leaderboard.get("repeat"), Some(REPEATS));
        for i in 0..DISTINCT {
            assert_eq!(leaderboard.get(&format!("player{}", i)), Some(i as u32));
        }
    }
}
