//! Error types of the allocators and the assignment solver.

use std::fmt;

/// Malformed input: the offending entity is named by its index.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The student's rank list has no entry for this track
    MissingRank { student: usize, track: usize },
    /// Ranks must be positive
    InvalidRank { student: usize, track: usize, rank: u32 },
    /// Tracks must offer at least one seat
    InvalidCapacity { track: usize, capacity: usize },
    /// The solver only accepts square cost matrices
    NonSquareMatrix { rows: usize, columns: usize },
    /// A cost matrix entry is not finite (NaN or infinite)
    InvalidCost { row: usize, column: usize },
    /// A cost matrix entry is too large in magnitude to be solved without overflow
    CostOutOfRange { row: usize, column: usize },
    /// The student order handed to a greedy allocator is not a permutation of all students
    InvalidOrder(String),
    /// An assignment violates the seat/student invariants
    InvalidAssignment(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingRank { student, track } => {
                write!(f, "Student {} has no rank for track {}", student, track)
            }
            ConfigurationError::InvalidRank {
                student,
                track,
                rank,
            } => write!(
                f,
                "Student {} has invalid rank {} for track {} (ranks start at 1)",
                student, rank, track
            ),
            ConfigurationError::InvalidCapacity { track, capacity } => {
                write!(f, "Track {} has invalid capacity {}", track, capacity)
            }
            ConfigurationError::NonSquareMatrix { rows, columns } => write!(
                f,
                "Cost matrix must be square, got {} rows and {} columns",
                rows, columns
            ),
            ConfigurationError::InvalidCost { row, column } => {
                write!(f, "Cost matrix entry ({}, {}) is not a finite number", row, column)
            }
            ConfigurationError::CostOutOfRange { row, column } => write!(
                f,
                "Cost matrix entry ({}, {}) is too large for the edge weight type",
                row, column
            ),
            ConfigurationError::InvalidOrder(msg) => write!(f, "Invalid student order: {}", msg),
            ConfigurationError::InvalidAssignment(msg) => write!(f, "Invalid assignment: {}", msg),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Not enough seats for all students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfeasibleInputError {
    pub total_capacity: usize,
    pub students: usize,
}

impl fmt::Display for InfeasibleInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} students cannot be seated in {} seats",
            self.students, self.total_capacity
        )
    }
}

impl std::error::Error for InfeasibleInputError {}

/// Error type returned by all allocators
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationError {
    Configuration(ConfigurationError),
    Infeasible(InfeasibleInputError),
    /// Every track of the student's preference list was full when the student's turn came
    PreferencesExhausted { student: usize },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::Configuration(err) => write!(f, "{}", err),
            AllocationError::Infeasible(err) => write!(f, "{}", err),
            AllocationError::PreferencesExhausted { student } => write!(
                f,
                "No track of student {}'s preference list has a free seat left",
                student
            ),
        }
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AllocationError::Configuration(err) => Some(err),
            AllocationError::Infeasible(err) => Some(err),
            AllocationError::PreferencesExhausted { .. } => None,
        }
    }
}

impl From<ConfigurationError> for AllocationError {
    fn from(err: ConfigurationError) -> Self {
        AllocationError::Configuration(err)
    }
}

impl From<InfeasibleInputError> for AllocationError {
    fn from(err: InfeasibleInputError) -> Self {
        AllocationError::Infeasible(err)
    }
}
