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


//! Comparison study of the allocators over many independent trials.
//!
//! Each trial derives its own random number generator from `StudyConfig::base_seed` and the trial's index. The
//! generator is used to create the trial's preference table (by a caller-provided function) and the student order
//! for the greedy allocators. Thus, the results only depend on the configuration, not on the scheduling of trials.
//!
//! Trials are solved by a number of worker threads, which take the next pending trial index from a shared queue. The
//! first failing trial stops the workers from starting new trials.

use crate::error::AllocationError;
use crate::metrics::{evaluate, Metrics};
use crate::{PreferenceTable, Rank};
use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::thread;

/// The compared allocators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    RandomOrder,
    DeferredPreference,
    Optimal,
}

impl Method {
    pub const ALL: [Method; 3] = [
        Method::RandomOrder,
        Method::DeferredPreference,
        Method::Optimal,
    ];
}

fn default_trials() -> usize {
    100
}

/// Parameters of a comparison study
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StudyConfig {
    /// Number of independent trials
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Number of worker threads
    #[serde(default = "num_cpus::get")]
    pub threads: usize,
    /// Seed of the first trial; trial i uses `base_seed + i`
    #[serde(default)]
    pub base_seed: u64,
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig {
            trials: default_trials(),
            threads: num_cpus::get(),
            base_seed: 0,
        }
    }
}

/// Quality measures of all allocators in a single trial
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialResult {
    pub trial: usize,
    pub seed: u64,
    pub metrics: Vec<(Method, Metrics)>,
}

impl TrialResult {
    pub fn get(&self, method: Method) -> Option<&Metrics> {
        self.metrics
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, metrics)| metrics)
    }
}

/// Aggregated quality measures of one allocator over all trials
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodSummary {
    pub method: Method,
    pub trials: usize,
    pub mean_cost: f64,
    pub mean_first_choices: f64,
    /// Worst rank assigned to any student in any trial
    pub worst_rank: Option<Rank>,
}

/// Run all allocators on `table`, using `order` for the greedy ones.
pub fn run_trial(
    table: &PreferenceTable,
    order: &[usize],
) -> Result<Vec<(Method, Metrics)>, AllocationError> {
    Method::ALL
        .iter()
        .map(|method| -> Result<(Method, Metrics), AllocationError> {
            let assignment = match method {
                Method::RandomOrder => crate::greedy::random_order(table, order)?,
                Method::DeferredPreference => crate::greedy::deferred_preference(table, order)?,
                Method::Optimal => crate::optimal::solve(table)?.0,
            };
            Ok((*method, evaluate(table, &assignment)))
        })
        .collect()
}

/// The shared state of the worker threads
struct SharedState {
    /// Index of the next trial to be started
    next_trial: usize,
    results: Vec<Option<TrialResult>>,
    /// Failure of the trial with the lowest index among the failed ones
    error: Option<(usize, AllocationError)>,
}

/// Run `config.trials` independent trials in parallel and return their results, ordered by trial index.
///
/// `generator` is called with the trial index and the trial's random number generator and must return the trial's
/// preference table. Afterwards, the same random number generator is used to draw the student order.
///
/// # Errors
///
/// If the generator or any allocator fails, no further trials are started and the error of the failed trial with the
/// lowest index is returned.
pub fn run_trials<F>(generator: F, config: &StudyConfig) -> Result<Vec<TrialResult>, AllocationError>
where
    F: 'static + Fn(usize, &mut StdRng) -> Result<PreferenceTable, AllocationError> + Send + Sync,
{
    let num_threads = config.threads.max(1).min(config.trials.max(1));
    info!(
        "Running {} trials on {} threads",
        config.trials, num_threads
    );
    let shared_state = Arc::new(Mutex::new(SharedState {
        next_trial: 0,
        results: vec![None; config.trials],
        error: None,
    }));

    // Spawn worker threads
    let generator = Arc::new(generator);
    let mut workers = Vec::<thread::JoinHandle<()>>::new();
    for _i in 0..num_threads {
        let state_clone = shared_state.clone();
        let generator_clone = generator.clone();
        let (trials, base_seed) = (config.trials, config.base_seed);
        workers.push(thread::spawn(move || {
            worker(state_clone, generator_clone, trials, base_seed)
        }));
    }

    // Wait for worker threads to finish
    for worker in workers {
        if let Err(panic) = worker.join() {
            std::panic::resume_unwind(panic);
        }
    }

    let mut shared_state = shared_state.lock().unwrap();
    if let Some((trial, err)) = shared_state.error.take() {
        info!("Trial {} failed: {}", trial, err);
        return Err(err);
    }
    let results: Vec<TrialResult> = shared_state.results.drain(..).flatten().collect();
    info!("Finished {} trials", results.len());
    Ok(results)
}

/// Worker thread entry point
fn worker<F>(shared_state: Arc<Mutex<SharedState>>, generator: Arc<F>, trials: usize, base_seed: u64)
where
    F: Fn(usize, &mut StdRng) -> Result<PreferenceTable, AllocationError>,
{
    loop {
        let trial = {
            let mut state = shared_state.lock().unwrap();
            if state.error.is_some() || state.next_trial >= trials {
                break;
            }
            state.next_trial += 1;
            state.next_trial - 1
        };

        let seed = base_seed.wrapping_add(trial as u64);
        let result = solve_trial(&*generator, trial, seed);

        let mut state = shared_state.lock().unwrap();
        match result {
            Ok(metrics) => {
                debug!("Trial {} finished: {:?}", trial, metrics);
                state.results[trial] = Some(TrialResult {
                    trial,
                    seed,
                    metrics,
                });
            }
            Err(err) => {
                if state.error.as_ref().map_or(true, |(t, _)| trial < *t) {
                    state.error = Some((trial, err));
                }
            }
        }
    }
}

fn solve_trial<F>(
    generator: &F,
    trial: usize,
    seed: u64,
) -> Result<Vec<(Method, Metrics)>, AllocationError>
where
    F: Fn(usize, &mut StdRng) -> Result<PreferenceTable, AllocationError>,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let table = generator(trial, &mut rng)?;
    let order = crate::order::random_order(table.students().len(), &mut rng);
    run_trial(&table, &order)
}

/// Aggregate trial results per allocator, ordered by ascending mean cost
pub fn summarize(results: &[TrialResult]) -> Vec<MethodSummary> {
    let mut summaries: Vec<MethodSummary> = Method::ALL
        .iter()
        .map(|method| {
            let metrics: Vec<&Metrics> = results.iter().filter_map(|r| r.get(*method)).collect();
            let trials = metrics.len();
            let mean = |value: &dyn Fn(&Metrics) -> f64| {
                if trials == 0 {
                    0.0
                } else {
                    metrics.iter().map(|m| value(m)).sum::<f64>() / trials as f64
                }
            };
            MethodSummary {
                method: *method,
                trials,
                mean_cost: mean(&|m: &Metrics| m.total_cost as f64),
                mean_first_choices: mean(&|m: &Metrics| m.first_choices as f64),
                worst_rank: metrics.iter().filter_map(|m| m.max_rank).max(),
            }
        })
        .collect();
    summaries.sort_by_key(|s| (OrderedFloat(s.mean_cost), s.method));
    summaries
}
