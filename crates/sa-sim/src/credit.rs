//! Credit-assignment signals computed from two waiting snapshots.
//!
//! `before` is the snapshot stored at the previous reevaluation, `after` the
//! one observed now.  A vehicle present in `before` and absent from `after`
//! has passed the intersection.

use sa_agent::WaitSnapshot;
use sa_learning::CreditSignal;

/// Vehicles waiting before that are no longer waiting.
pub fn throughput(before: &WaitSnapshot, after: &WaitSnapshot) -> usize {
    before.keys().filter(|id| !after.contains_key(*id)).count()
}

/// `throughput / waiting_before`, or `throughput` itself when nothing was
/// waiting.
pub fn throughput_ratio(throughput: usize, waiting_before: usize) -> f64 {
    if waiting_before == 0 {
        throughput as f64
    } else {
        throughput as f64 / waiting_before as f64
    }
}

/// Accumulated wait, as of `before`, of the vehicles that passed.
pub fn throughput_wait_time(before: &WaitSnapshot, after: &WaitSnapshot) -> f64 {
    before
        .iter()
        .filter(|(id, _)| !after.contains_key(*id))
        .map(|(_, wait)| wait)
        .sum()
}

pub fn total_wait_time(snapshot: &WaitSnapshot) -> f64 {
    snapshot.values().sum()
}

/// `throughput_wait / total_wait`, or `1` when `total_wait` is zero.
pub fn wait_time_reduced_ratio(throughput_wait: f64, total_wait: f64) -> f64 {
    if total_wait == 0.0 { 1.0 } else { throughput_wait / total_wait }
}

/// Waiting count after minus waiting count before.
pub fn queue_delta(before: &WaitSnapshot, after: &WaitSnapshot) -> i64 {
    after.len() as i64 - before.len() as i64
}

/// All credit quantities for one reevaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct CreditAssessment {
    pub throughput:           usize,
    pub throughput_wait_time: f64,
    pub total_wait_time:      f64,
    pub signal:               CreditSignal,
}

impl CreditAssessment {
    pub fn assess(before: &WaitSnapshot, after: &WaitSnapshot) -> Self {
        let throughput = throughput(before, after);
        let throughput_wait_time = throughput_wait_time(before, after);
        let total_wait_time = total_wait_time(before);
        Self {
            throughput,
            throughput_wait_time,
            total_wait_time,
            signal: CreditSignal {
                throughput_ratio:        throughput_ratio(throughput, before.len()),
                wait_time_reduced_ratio: wait_time_reduced_ratio(throughput_wait_time, total_wait_time),
                queue_delta:             queue_delta(before, after),
            },
        }
    }
}
