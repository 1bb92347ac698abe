// Copyright 2020 by Michael Thies <mail@mhthies.de>
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.


//! Solver for the assignment problem (minimum cost perfect matching in a complete bipartite graph), using the
//! hungarian method with shortest augmenting paths (Jonker-Volgenant style).
//!
//! Rows are added to the matching one after another. For each new row, a Dijkstra-like search over the reduced costs
//! `C[i,j] - u[i] - v[j]` finds the cheapest augmenting path to a free column, and the dual potentials `u`, `v` are
//! updated along the way, such that all matched edges stay tight and `u[i] + v[j] <= C[i,j]` holds for all edges.
//! After n augmentations the matching is perfect and optimal. Runtime is O(n^3), memory O(n) besides the matrix.

use crate::error::ConfigurationError;
use log::debug;
use num_traits::{Bounded, NumCast, Signed};

/// Matched column index for each row of the cost matrix
pub type Matching = ndarray::Array1<usize>;

/// Types usable as edge weights in the cost matrix.
///
/// Signed integers and floats qualify. The potentials of the algorithm may become negative even for non-negative
/// costs, so unsigned types are excluded.
///
/// Potentials and reduced costs are sums of up to 2n+2 cost values, so for an n×n matrix every entry must lie within
/// `±T::max_value() / (4 * (n + 1))` (see `cost_limit()`). Floats must be finite.
pub trait EdgeWeight: Signed + Bounded + NumCast + Copy + PartialOrd {}

impl<T: Signed + Bounded + NumCast + Copy + PartialOrd> EdgeWeight for T {}

/// Largest cost magnitude accepted for an n×n matrix. None if the bound cannot be represented in `T`.
pub fn cost_limit<T: EdgeWeight>(n: usize) -> Option<T> {
    let divisor: T = NumCast::from(n.checked_add(1)?.checked_mul(4)?)?;
    Some(T::max_value() / divisor)
}

/// Result of the hungarian method
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<T> {
    /// Column matched to each row
    pub matching: Matching,
    /// Total cost of the matching
    pub score: T,
    /// Dual potential of each row (`u`)
    pub row_potentials: ndarray::Array1<T>,
    /// Dual potential of each column (`v`)
    pub column_potentials: ndarray::Array1<T>,
}

/// Find a perfect matching of rows and columns of the square `cost_matrix`, which minimizes the sum of the costs of
/// the matched entries.
///
/// If multiple optimal matchings exist, the one found first by the augmenting path search is returned. An empty
/// matrix gives an empty matching with score 0.
///
/// # Errors
///
/// * `ConfigurationError::NonSquareMatrix` if the matrix is not square
/// * `ConfigurationError::InvalidCost` if it contains a NaN or infinite entry
/// * `ConfigurationError::CostOutOfRange` if an entry exceeds `cost_limit(n)` in magnitude
pub fn hungarian_algorithm<T: EdgeWeight>(
    cost_matrix: &ndarray::Array2<T>,
) -> Result<Solution<T>, ConfigurationError> {
    let (n, m) = cost_matrix.dim();
    if n != m {
        return Err(ConfigurationError::NonSquareMatrix {
            rows: n,
            columns: m,
        });
    }
    let limit: Option<T> = cost_limit(n);
    for ((row, column), c) in cost_matrix.indexed_iter() {
        // x - x is NaN for NaN and infinite floats and 0 for everything else
        #[allow(clippy::eq_op)]
        let finite = *c - *c == T::zero();
        if !finite {
            return Err(ConfigurationError::InvalidCost { row, column });
        }
        match limit {
            Some(limit) if *c <= limit && *c >= -limit => (),
            _ => return Err(ConfigurationError::CostOutOfRange { row, column }),
        }
    }

    // Column n is a virtual root column, which holds the row to be inserted during each augmentation.
    let mut u = vec![T::zero(); n];
    let mut v = vec![T::zero(); n + 1];
    let mut column_match: Vec<Option<usize>> = vec![None; n + 1];
    // Predecessor column of each column on the current shortest path tree
    let mut way = vec![n; n + 1];

    for row in 0..n {
        column_match[n] = Some(row);
        let mut min_reduced: Vec<Option<T>> = vec![None; n + 1];
        let mut used = vec![false; n + 1];
        let mut j0 = n;

        // Grow the shortest path tree until a free column is reached
        while let Some(i0) = column_match[j0] {
            used[j0] = true;
            let mut next: Option<(usize, T)> = None;
            for j in 0..n {
                if used[j] {
                    continue;
                }
                let reduced = cost_matrix[[i0, j]] - u[i0] - v[j];
                if min_reduced[j].map_or(true, |current| reduced < current) {
                    min_reduced[j] = Some(reduced);
                    way[j] = j0;
                }
                if let Some(candidate) = min_reduced[j] {
                    if next.map_or(true, |(_, delta)| candidate < delta) {
                        next = Some((j, candidate));
                    }
                }
            }
            // At most `row` real columns are in the tree, so an unused column is always left.
            let (j1, delta) = next.expect("no unused column left while searching an augmenting path");

            for j in 0..=n {
                if used[j] {
                    if let Some(i) = column_match[j] {
                        u[i] = u[i] + delta;
                    }
                    v[j] = v[j] - delta;
                } else if let Some(current) = min_reduced[j] {
                    min_reduced[j] = Some(current - delta);
                }
            }
            j0 = j1;
        }

        // Augment along the path back to the root column
        let mut augmentation_length = 0;
        while j0 != n {
            let j1 = way[j0];
            column_match[j0] = column_match[j1];
            j0 = j1;
            augmentation_length += 1;
        }
        debug!(
            "Inserted row {} with an augmenting path of length {}",
            row, augmentation_length
        );
    }

    let mut matching = Matching::zeros([n]);
    for (j, i) in column_match.iter().take(n).enumerate() {
        if let Some(i) = i {
            matching[*i] = j;
        }
    }
    let score = matching
        .iter()
        .enumerate()
        .fold(T::zero(), |acc, (i, j)| acc + cost_matrix[[i, *j]]);
    v.truncate(n);

    Ok(Solution {
        matching,
        score,
        row_potentials: ndarray::Array1::from_vec(u),
        column_potentials: ndarray::Array1::from_vec(v),
    })
}
