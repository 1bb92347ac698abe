//! Allocation of students to training tracks with limited seats.
//!
//! Three allocators are provided and can be compared with the functions in `metrics` and `study`:
//! * `greedy::random_order()`: students pick their most preferred track with a free seat, one after another
//! * `greedy::deferred_preference()`: all achievable first preferences are served before any second preference, etc.
//! * `optimal::solve()`: a minimum total rank assignment, calculated with the hungarian method (see `hungarian`)

pub mod error;
pub mod greedy;
pub mod hungarian;
pub mod io;
pub mod metrics;
pub mod optimal;
pub mod order;
pub mod study;

use error::ConfigurationError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of seats of a track, if the input does not specify one
pub const DEFAULT_CAPACITY: usize = 8;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// A student's preference value for a track. 1 is the most preferred track.
pub type Rank = u32;

/// Representation of a student and their preferences
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// id/index of the Student in the list of students
    #[serde(skip)]
    pub index: usize,
    /// Student's name. Mainly used for info/debug output
    pub name: String,
    /// Rank of every track, indexed by the track's index
    pub ranks: Vec<Rank>,
}

/// Representation of a training track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// id/index of the Track in the list of tracks
    #[serde(skip)]
    pub index: usize,
    /// Track's name. Mainly used for info/debug output
    pub name: String,
    /// Number of seats
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// One unit of capacity within a track. `seat` is 0-based, i.e. `seat < capacity` of the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat {
    pub track: usize,
    pub seat: usize,
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {}, seat {}", self.track, self.seat + 1)
    }
}

/// Result of an allocation: the seat of each student, indexed by the student's index.
pub type Assignment = Vec<Seat>;

/// Validated, immutable preference data of all students for all tracks
#[derive(Clone, Debug, PartialEq)]
pub struct PreferenceTable {
    students: Vec<Student>,
    tracks: Vec<Track>,
}

impl PreferenceTable {
    /// Create a preference table from a list of students (each with one rank per track) and a list of tracks.
    ///
    /// The `index` fields of students and tracks are overwritten with their position in the lists.
    ///
    /// # Errors
    ///
    /// Fails with a `ConfigurationError`, if any student lacks a rank for some track, has a rank for a track that does
    /// not exist, has a rank of 0, or if any track has no seats.
    pub fn new(
        mut students: Vec<Student>,
        mut tracks: Vec<Track>,
    ) -> Result<Self, ConfigurationError> {
        for (i, t) in tracks.iter_mut().enumerate() {
            t.index = i;
            if t.capacity == 0 {
                return Err(ConfigurationError::InvalidCapacity {
                    track: i,
                    capacity: t.capacity,
                });
            }
        }
        for (i, s) in students.iter_mut().enumerate() {
            s.index = i;
            if s.ranks.len() < tracks.len() {
                return Err(ConfigurationError::MissingRank {
                    student: i,
                    track: s.ranks.len(),
                });
            }
            if s.ranks.len() > tracks.len() {
                return Err(ConfigurationError::InvalidRank {
                    student: i,
                    track: tracks.len(),
                    rank: s.ranks[tracks.len()],
                });
            }
            if let Some(t) = s.ranks.iter().position(|r| *r == 0) {
                return Err(ConfigurationError::InvalidRank {
                    student: i,
                    track: t,
                    rank: 0,
                });
            }
        }

        let table = PreferenceTable { students, tracks };
        for s in table.students.iter() {
            if !table.is_strict_row(s.index) {
                warn!(
                    "Ranks of student {} ({}) are not a permutation of 1..{}",
                    s.index,
                    s.name,
                    table.tracks.len()
                );
            }
        }
        Ok(table)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Rank of `track` for `student`. Panics if either index is out of range.
    pub fn rank(&self, student: usize, track: usize) -> Rank {
        self.students[student].ranks[track]
    }

    /// Total number of seats of all tracks
    pub fn total_capacity(&self) -> usize {
        self.tracks.iter().map(|t| t.capacity).sum()
    }

    /// Largest rank value present in the table, None if there are no ranks at all.
    pub fn max_rank(&self) -> Option<Rank> {
        self.students
            .iter()
            .flat_map(|s| s.ranks.iter().cloned())
            .max()
    }

    /// All distinct rank values present in the table in ascending order
    pub fn distinct_ranks(&self) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = self
            .students
            .iter()
            .flat_map(|s| s.ranks.iter().cloned())
            .collect();
        ranks.sort_unstable();
        ranks.dedup();
        ranks
    }

    /// Check if every student's ranks form a permutation of 1..n_tracks (no ties, no gaps)
    pub fn is_strict(&self) -> bool {
        (0..self.students.len()).all(|s| self.is_strict_row(s))
    }

    fn is_strict_row(&self, student: usize) -> bool {
        let mut seen = vec![false; self.tracks.len()];
        for r in self.students[student].ranks.iter() {
            let r = *r as usize;
            if r == 0 || r > seen.len() || seen[r - 1] {
                return false;
            }
            seen[r - 1] = true;
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    pub(crate) fn student(name: &str, ranks: &[Rank]) -> Student {
        Student {
            index: 0,
            name: String::from(name),
            ranks: ranks.to_vec(),
        }
    }

    pub(crate) fn track(name: &str, capacity: usize) -> Track {
        Track {
            index: 0,
            name: String::from(name),
            capacity,
        }
    }

    #[test]
    fn table_assigns_indexes() {
        let table = PreferenceTable::new(
            vec![student("Anton", &[1, 2]), student("Berta", &[2, 1])],
            vec![track("Sailing", 2), track("Rowing", 3)],
        )
        .unwrap();
        assert_eq!(table.students()[1].index, 1);
        assert_eq!(table.tracks()[1].index, 1);
        assert_eq!(table.rank(1, 0), 2);
        assert_eq!(table.total_capacity(), 5);
        assert_eq!(table.max_rank(), Some(2));
        assert!(table.is_strict());
    }

    #[test]
    fn table_rejects_malformed_input() {
        assert_eq!(
            PreferenceTable::new(
                vec![student("Anton", &[1, 2]), student("Berta", &[1])],
                vec![track("Sailing", 2), track("Rowing", 3)],
            ),
            Err(ConfigurationError::MissingRank {
                student: 1,
                track: 1
            })
        );
        assert_eq!(
            PreferenceTable::new(
                vec![student("Anton", &[1, 0])],
                vec![track("Sailing", 2), track("Rowing", 3)],
            ),
            Err(ConfigurationError::InvalidRank {
                student: 0,
                track: 1,
                rank: 0
            })
        );
        assert_eq!(
            PreferenceTable::new(
                vec![student("Anton", &[1, 2])],
                vec![track("Sailing", 2), track("Rowing", 0)],
            ),
            Err(ConfigurationError::InvalidCapacity {
                track: 1,
                capacity: 0
            })
        );
    }

    #[test]
    fn table_accepts_ties() {
        let table = PreferenceTable::new(
            vec![student("Anton", &[1, 1, 3]), student("Berta", &[3, 1, 2])],
            vec![track("Sailing", 1), track("Rowing", 1), track("Diving", 1)],
        )
        .unwrap();
        assert!(!table.is_strict());
        assert_eq!(table.distinct_ranks(), vec![1, 2, 3]);
    }

    #[test]
    fn track_capacity_defaults() {
        let t: Track = serde_json::from_str(r#"{"name": "Sailing"}"#).unwrap();
        assert_eq!(t.capacity, DEFAULT_CAPACITY);
    }
}
