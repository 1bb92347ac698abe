//! Quality measures of an assignment, used to compare the allocators.

use crate::error::ConfigurationError;
use crate::{Assignment, PreferenceTable, Rank, Seat};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sum of ranks of an assignment (lower is better)
pub type Cost = u32;

/// All quality measures of one assignment
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total_cost: Cost,
    /// Worst rank any student got. None for an empty assignment.
    pub max_rank: Option<Rank>,
    /// Best rank any student got. None for an empty assignment.
    pub min_rank: Option<Rank>,
    /// Number of students placed in a track of rank 1
    pub first_choices: usize,
}

fn assigned_ranks<'a>(
    table: &'a PreferenceTable,
    assignment: &'a Assignment,
) -> impl Iterator<Item = Rank> + 'a {
    assignment
        .iter()
        .enumerate()
        .map(move |(s, seat)| table.rank(s, seat.track))
}

pub fn total_cost(table: &PreferenceTable, assignment: &Assignment) -> Cost {
    assigned_ranks(table, assignment).sum()
}

pub fn max_rank(table: &PreferenceTable, assignment: &Assignment) -> Option<Rank> {
    assigned_ranks(table, assignment).max()
}

pub fn min_rank(table: &PreferenceTable, assignment: &Assignment) -> Option<Rank> {
    assigned_ranks(table, assignment).min()
}

pub fn first_choice_count(table: &PreferenceTable, assignment: &Assignment) -> usize {
    assigned_ranks(table, assignment).filter(|r| *r == 1).count()
}

/// Calculate all quality measures of `assignment` at once
pub fn evaluate(table: &PreferenceTable, assignment: &Assignment) -> Metrics {
    Metrics {
        total_cost: total_cost(table, assignment),
        max_rank: max_rank(table, assignment),
        min_rank: min_rank(table, assignment),
        first_choices: first_choice_count(table, assignment),
    }
}

/// Seat -> student view of an assignment. If two students share a seat, the later one wins.
pub fn occupants(assignment: &Assignment) -> BTreeMap<Seat, usize> {
    assignment
        .iter()
        .enumerate()
        .map(|(s, seat)| (*seat, s))
        .collect()
}

/// Check that `assignment` places every student of `table` on exactly one existing seat and no seat holds more than
/// one student.
pub fn check_assignment(
    table: &PreferenceTable,
    assignment: &Assignment,
) -> Result<(), ConfigurationError> {
    if assignment.len() != table.students().len() {
        return Err(ConfigurationError::InvalidAssignment(format!(
            "{} seats given for {} students",
            assignment.len(),
            table.students().len()
        )));
    }
    let mut holder: BTreeMap<Seat, usize> = BTreeMap::new();
    for (s, seat) in assignment.iter().enumerate() {
        match table.tracks().get(seat.track) {
            None => {
                return Err(ConfigurationError::InvalidAssignment(format!(
                    "student {} is placed in unknown track {}",
                    s, seat.track
                )))
            }
            Some(t) if seat.seat >= t.capacity => {
                return Err(ConfigurationError::InvalidAssignment(format!(
                    "student {} is placed in {}, but the track has only {} seats",
                    s, seat, t.capacity
                )))
            }
            _ => (),
        }
        if let Some(other) = holder.insert(*seat, s) {
            return Err(ConfigurationError::InvalidAssignment(format!(
                "students {} and {} share {}",
                other, s, seat
            )));
        }
    }
    Ok(())
}
