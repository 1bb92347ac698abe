//! Helpers for explicit randomness: student orders for the greedy allocators, uniformly random preference tables and
//! exhaustive enumeration of permutations.

use crate::{PreferenceTable, Rank, Student, Track};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random permutation of the indexes 0..n
pub fn random_order<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Random permutation of the indexes 0..n, reproducible from `seed`
pub fn seeded_order(n: usize, seed: u64) -> Vec<usize> {
    random_order(n, &mut StdRng::seed_from_u64(seed))
}

/// Check that `order` contains every index of 0..n exactly once
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for i in order {
        if *i >= n || seen[*i] {
            return false;
        }
        seen[*i] = true;
    }
    true
}

/// Generate a strict preference table with every student's ranks drawn uniformly at random from the permutations of
/// 1..n_tracks. All tracks get the same `capacity`.
pub fn uniform_preferences<R: Rng + ?Sized>(
    num_students: usize,
    num_tracks: usize,
    capacity: usize,
    rng: &mut R,
) -> Result<PreferenceTable, crate::error::ConfigurationError> {
    let tracks = (0..num_tracks)
        .map(|t| Track {
            index: t,
            name: format!("Track {}", t + 1),
            capacity,
        })
        .collect();
    let students = (0..num_students)
        .map(|s| {
            let mut ranks: Vec<Rank> = (1..=num_tracks as Rank).collect();
            ranks.shuffle(rng);
            Student {
                index: s,
                name: format!("Student {}", s + 1),
                ranks,
            }
        })
        .collect();
    PreferenceTable::new(students, tracks)
}

pub trait IterPermutations<'a, T> {
    /// Iterate all permutations of the elements of this collection
    ///
    /// Returns an iterator which returns Vec's of borrowed elements from the collection, n! of them in total (one
    /// empty permutation for an empty collection). Permutations are generated with Heap's algorithm, so each step only
    /// swaps two elements.
    fn permutations(&'a self) -> PermutationIterator<'a, T>;
}

impl<'a, T> IterPermutations<'a, T> for [T] {
    fn permutations(&'a self) -> PermutationIterator<'a, T> {
        PermutationIterator {
            current: self.iter().collect(),
            counters: vec![0; self.len()],
            position: 0,
            started: false,
        }
    }
}

pub struct PermutationIterator<'a, T> {
    current: Vec<&'a T>,
    /// Loop counters of the non-recursive Heap's algorithm
    counters: Vec<usize>,
    position: usize,
    started: bool,
}

impl<'a, T> Iterator for PermutationIterator<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.current.clone());
        }

        let n = self.current.len();
        while self.position < n {
            if self.counters[self.position] < self.position {
                if self.position % 2 == 0 {
                    self.current.swap(0, self.position);
                } else {
                    self.current
                        .swap(self.counters[self.position], self.position);
                }
                self.counters[self.position] += 1;
                self.position = 0;
                return Some(self.current.clone());
            } else {
                self.counters[self.position] = 0;
                self.position += 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::IterPermutations;

    #[test]
    fn simple_test() {
        let data = [1, 2, 3];
        let mut permutations: Vec<Vec<&i32>> = data[..].permutations().collect();
        assert_eq!(permutations.len(), 6);
        permutations.sort();
        assert_eq!(
            permutations,
            vec![
                vec![&1, &2, &3],
                vec![&1, &3, &2],
                vec![&2, &1, &3],
                vec![&2, &3, &1],
                vec![&3, &1, &2],
                vec![&3, &2, &1]
            ]
        )
    }

    #[test]
    fn permutation_count() {
        let data: Vec<usize> = (0..6).collect();
        let mut permutations: Vec<Vec<&usize>> = data.permutations().collect();
        assert_eq!(permutations.len(), 720);
        permutations.sort();
        permutations.dedup();
        assert_eq!(permutations.len(), 720);
    }

    #[test]
    fn empty_collection() {
        let data: Vec<String> = Vec::new();
        assert_eq!(data.permutations().count(), 1);
    }

    #[test]
    fn seeded_order_is_reproducible() {
        let a = super::seeded_order(50, 1234);
        let b = super::seeded_order(50, 1234);
        assert_eq!(a, b);
        assert!(super::is_permutation(&a, 50));
        assert!(!super::is_permutation(&[0, 1, 1], 3));
        assert!(!super::is_permutation(&[0, 1, 3], 3));
        assert!(!super::is_permutation(&[0, 1], 3));
    }

    #[test]
    fn uniform_preferences_are_strict() {
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(9);
        let table = super::uniform_preferences(20, 5, 4, &mut rng).unwrap();
        assert!(table.is_strict());
        assert_eq!(table.students().len(), 20);
        assert_eq!(table.total_capacity(), 20);
    }
}
