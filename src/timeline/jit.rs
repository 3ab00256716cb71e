//! Just-in-time worker timeline.
//!
//! For every contractor and worker type the timeline keeps a stack of
//! *offers* `(release_time, count)`: `count` workers that are free from
//! `release_time` on. The stack is sorted by descending release time, so the
//! earliest offer sits on top.
//!
//! A team starts once enough workers of every type have been released. The
//! earliest offers are taken first. A released worker stays free until some
//! work takes it, so the team is continuously available from the start time
//! until it is handed back at the block's finish.
//!
//! Workers are never lent backwards in time. Already-committed blocks never
//! move, and the capacity invariant holds by construction because each
//! worker belongs to at most one offer.

use super::Timeline;
use crate::models::{Time, WorkerCount};

/// Worker availability per contractor and worker type.
#[derive(Debug, Clone)]
pub struct JustInTimeTimeline {
    /// `offers[contractor][worker_type]`, sorted by descending release time.
    offers: Vec<Vec<Vec<(Time, WorkerCount)>>>,
    capacities: Vec<Vec<WorkerCount>>,
}

impl JustInTimeTimeline {
    /// Creates a timeline where all workers are free at t=0.
    pub fn new(capacities: Vec<Vec<WorkerCount>>) -> Self {
        let offers = capacities
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&count| if count > 0 { vec![(0, count)] } else { Vec::new() })
                    .collect()
            })
            .collect();
        Self { offers, capacities }
    }

    /// Earliest time at which the whole team is free.
    ///
    /// The request must not exceed capacity (see
    /// [`Timeline::capacity_shortfall`]).
    pub fn earliest_start(&self, contractor: usize, workers: &[WorkerCount]) -> Time {
        let mut earliest: Time = 0;
        for (worker_type, &needed) in workers.iter().enumerate() {
            let mut needed = needed;
            let stack = &self.offers[contractor][worker_type];
            for &(release, count) in stack.iter().rev() {
                if needed == 0 {
                    break;
                }
                earliest = earliest.max(release);
                needed = needed.saturating_sub(count);
            }
        }
        earliest
    }

    /// Takes the team from the earliest offers and returns it at `finish`.
    pub fn schedule(&mut self, contractor: usize, workers: &[WorkerCount], finish: Time) {
        for (worker_type, &count) in workers.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let stack = &mut self.offers[contractor][worker_type];

            let mut needed = count;
            while needed > 0 {
                let Some((release, available)) = stack.pop() else {
                    break;
                };
                if available > needed {
                    stack.push((release, available - needed));
                    break;
                }
                needed -= available;
            }

            let idx = stack.partition_point(|&(t, _)| t > finish);
            match stack.get_mut(idx) {
                Some(offer) if offer.0 == finish => offer.1 += count,
                _ => stack.insert(idx, (finish, count)),
            }
        }
    }

    /// Workers of a type free at time `t` and not yet taken.
    pub fn available_at(&self, contractor: usize, worker_type: usize, t: Time) -> WorkerCount {
        self.offers
            .get(contractor)
            .and_then(|row| row.get(worker_type))
            .map_or(0, |stack| {
                stack
                    .iter()
                    .filter(|&&(release, _)| release <= t)
                    .map(|&(_, count)| count)
                    .sum()
            })
    }
}

impl Timeline for JustInTimeTimeline {
    fn capacities(&self) -> &[Vec<WorkerCount>] {
        &self.capacities
    }

    /// Release order does not depend on the block length, so `duration` is
    /// not consulted.
    fn find_start(
        &self,
        contractor: usize,
        workers: &[WorkerCount],
        not_before: Time,
        _duration: Time,
    ) -> Time {
        not_before.max(self.earliest_start(contractor, workers))
    }

    fn commit(&mut self, contractor: usize, workers: &[WorkerCount], _start: Time, finish: Time) {
        self.schedule(contractor, workers, finish);
    }
}
