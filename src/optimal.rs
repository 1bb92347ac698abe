//! Optimal allocation via the assignment problem.
//!
//! Every track is expanded into one matrix row per seat, every student becomes a matrix column. The matrix is squared
//! up with dummy students, whose rank for every track is the worst rank of the table, so they only take seats no real
//! student needs. All the data conversion from PreferenceTable to matrices and back happens in this module, the actual
//! optimization is done by `hungarian::hungarian_algorithm()`.


use crate::error::{AllocationError, InfeasibleInputError};
use crate::metrics::Cost;
use crate::{Assignment, PreferenceTable, Seat};
use log::{debug, info};

/// Edge weight of the cost matrix. Costs are ranks, so they are exact in any integer type wide enough for their sum.
pub type EdgeWeight = i64;

/// Square assignment problem generated from a PreferenceTable
pub struct PreComputedProblem {
    /// Cost matrix: Each row represents one seat, each column one student (or dummy student)
    pub cost_matrix: ndarray::Array2<EdgeWeight>,
    /// Maps each row of the cost matrix to the represented seat
    pub seat_map: Vec<Seat>,
    /// Maps each column of the cost matrix to the student's index. None for dummy students.
    pub student_map: Vec<Option<usize>>,
    /// Maps track index to the row index of its first seat
    pub inverse_track_map: Vec<usize>,
}

/// Generate the square assignment problem for `table`.
///
/// # Errors
///
/// Fails with `AllocationError::Infeasible`, if there are more students than seats.
pub fn precompute_problem(table: &PreferenceTable) -> Result<PreComputedProblem, AllocationError> {
    let n = table.total_capacity();
    let num_students = table.students().len();
    if num_students > n {
        return Err(InfeasibleInputError {
            total_capacity: n,
            students: num_students,
        }
        .into());
    }

    // Generate seat_map and inverse_track_map from track list
    let mut seat_map = Vec::<Seat>::with_capacity(n);
    let mut inverse_track_map = Vec::<usize>::with_capacity(table.tracks().len());
    for t in table.tracks().iter() {
        inverse_track_map.push(seat_map.len());
        seat_map.extend((0..t.capacity).map(|seat| Seat {
            track: t.index,
            seat,
        }));
    }

    // Real students first, then dummies
    let num_dummies = n - num_students;
    let student_map: Vec<Option<usize>> = (0..num_students)
        .map(Some)
        .chain(std::iter::repeat(None).take(num_dummies))
        .collect();
    debug!(
        "Expanded {} tracks into {} seats, adding {} dummy students",
        table.tracks().len(),
        n,
        num_dummies
    );

    let dummy_cost = table.max_rank().unwrap_or(0) as EdgeWeight;
    let cost_matrix = ndarray::Array2::from_shape_fn([n, n], |(row, column)| {
        match student_map[column] {
            Some(s) => table.rank(s, seat_map[row].track) as EdgeWeight,
            None => dummy_cost,
        }
    });

    Ok(PreComputedProblem {
        cost_matrix,
        seat_map,
        student_map,
        inverse_track_map,
    })
}

/// Calculate an assignment with minimal total rank.
///
/// Returns the assignment together with its total cost (sum of the real students' ranks).
///
/// # Errors
///
/// Fails with `AllocationError::Infeasible`, if there are more students than seats.
pub fn solve(table: &PreferenceTable) -> Result<(Assignment, Cost), AllocationError> {
    let problem = precompute_problem(table)?;
    let solution = crate::hungarian::hungarian_algorithm(&problem.cost_matrix)?;

    // Convert seat matching to student assignment, dropping the dummies
    let mut seats: Vec<Option<Seat>> = vec![None; table.students().len()];
    for (row, column) in solution.matching.iter().enumerate() {
        if let Some(s) = problem.student_map[*column] {
            seats[s] = Some(problem.seat_map[row]);
        }
    }
    let assignment = seats
        .into_iter()
        .enumerate()
        .map(|(student, seat)| seat.ok_or(AllocationError::PreferencesExhausted { student }))
        .collect::<Result<Assignment, AllocationError>>()?;

    let cost = crate::metrics::total_cost(table, &assignment);
    let num_dummies = problem.student_map.iter().filter(|s| s.is_none()).count();
    debug_assert_eq!(
        solution.score,
        cost as EdgeWeight + num_dummies as EdgeWeight * table.max_rank().unwrap_or(0) as EdgeWeight
    );
    info!(
        "Optimal allocation placed {} students with total cost {}",
        assignment.len(),
        cost
    );
    Ok((assignment, cost))
}
