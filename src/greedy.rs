//! Greedy baseline allocators.
//!
//! Both allocators take an explicit student order (see `order::random_order()`), so results are reproducible for a
//! given seed. Placements are final once made; there is no backtracking.


use crate::error::{AllocationError, ConfigurationError, InfeasibleInputError};
use crate::{Assignment, PreferenceTable, Seat};
use log::{debug, info};

/// Running count of occupied seats per track
struct SeatLedger {
    filled: Vec<usize>,
    capacity: Vec<usize>,
}

impl SeatLedger {
    fn new(table: &PreferenceTable) -> Self {
        SeatLedger {
            filled: vec![0; table.tracks().len()],
            capacity: table.tracks().iter().map(|t| t.capacity).collect(),
        }
    }

    fn is_full(&self, track: usize) -> bool {
        self.filled[track] >= self.capacity[track]
    }

    /// Occupy the next free seat of `track`. The track must not be full.
    fn take(&mut self, track: usize) -> Seat {
        let seat = Seat {
            track,
            seat: self.filled[track],
        };
        self.filled[track] += 1;
        seat
    }
}

/// Common input checks of both greedy allocators
fn check_input(table: &PreferenceTable, order: &[usize]) -> Result<(), AllocationError> {
    let num_students = table.students().len();
    if table.total_capacity() < num_students {
        return Err(InfeasibleInputError {
            total_capacity: table.total_capacity(),
            students: num_students,
        }
        .into());
    }
    if !crate::order::is_permutation(order, num_students) {
        return Err(ConfigurationError::InvalidOrder(format!(
            "expected a permutation of {} student indexes, got {} entries",
            num_students,
            order.len()
        ))
        .into());
    }
    Ok(())
}

/// Convert the per-student seats into an Assignment, failing for the first student without a seat
fn collect_assignment(seats: Vec<Option<Seat>>) -> Result<Assignment, AllocationError> {
    seats
        .into_iter()
        .enumerate()
        .map(|(student, seat)| seat.ok_or(AllocationError::PreferencesExhausted { student }))
        .collect()
}

/// Assign students one after another in the given `order`, each to the most preferred track which still has a free
/// seat.
///
/// If multiple non-full tracks share the student's best rank, the track with the lowest index is chosen.
///
/// # Errors
///
/// * `AllocationError::Infeasible`, if there are less seats than students
/// * `AllocationError::Configuration`, if `order` is not a permutation of all student indexes
pub fn random_order(table: &PreferenceTable, order: &[usize]) -> Result<Assignment, AllocationError> {
    check_input(table, order)?;
    let mut ledger = SeatLedger::new(table);
    let mut seats: Vec<Option<Seat>> = vec![None; table.students().len()];

    for s in order.iter() {
        let best_track = (0..table.tracks().len())
            .filter(|t| !ledger.is_full(*t))
            .min_by_key(|t| (table.rank(*s, *t), *t))
            .ok_or(AllocationError::PreferencesExhausted { student: *s })?;
        let seat = ledger.take(best_track);
        debug!(
            "Student {} gets {} (rank {})",
            s,
            seat,
            table.rank(*s, best_track)
        );
        seats[*s] = Some(seat);
    }

    info!(
        "Random order allocation placed {} students",
        table.students().len()
    );
    collect_assignment(seats)
}

/// Assign students in passes of ascending rank: In pass k, every still unassigned student (in the given `order`) is
/// assigned to a track of rank k, if one of those has a free seat left.
///
/// Passes are made for every distinct rank value in the table, so ties and gaps in the ranks are handled as well. If
/// a student ranks multiple tracks equally, the track with the lowest index and a free seat is chosen.
///
/// # Errors
///
/// * `AllocationError::Infeasible`, if there are less seats than students
/// * `AllocationError::Configuration`, if `order` is not a permutation of all student indexes
/// * `AllocationError::PreferencesExhausted`, if a student is left without seat after all passes. This cannot happen
///   for complete tables with sufficient capacity, but is reported instead of placing the student arbitrarily.
pub fn deferred_preference(
    table: &PreferenceTable,
    order: &[usize],
) -> Result<Assignment, AllocationError> {
    check_input(table, order)?;
    let mut ledger = SeatLedger::new(table);
    let mut seats: Vec<Option<Seat>> = vec![None; table.students().len()];
    let mut unassigned: Vec<usize> = order.to_vec();

    for rank in table.distinct_ranks() {
        if unassigned.is_empty() {
            break;
        }
        let before = unassigned.len();
        unassigned.retain(|s| {
            let track = (0..table.tracks().len())
                .find(|t| table.rank(*s, *t) == rank && !ledger.is_full(*t));
            match track {
                Some(t) => {
                    seats[*s] = Some(ledger.take(t));
                    false
                }
                None => true,
            }
        });
        debug!(
            "Pass for rank {} placed {} students, {} left",
            rank,
            before - unassigned.len(),
            unassigned.len()
        );
    }

    if let Some(s) = unassigned.first() {
        return Err(AllocationError::PreferencesExhausted { student: *s });
    }
    info!(
        "Deferred preference allocation placed {} students",
        table.students().len()
    );
    collect_assignment(seats)
}
