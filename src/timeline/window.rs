//! Earliest-window worker timeline.
//!
//! Keeps every committed reservation `(start, finish, count)` per contractor
//! and worker type. A block is placed at the earliest `t >= not_before` such
//! that, over `[t, t + duration)`, peak usage plus the request stays within
//! capacity for every requested type. Gaps left before already-committed
//! blocks are filled; the committed blocks themselves never move.
//!
//! The earliest feasible start is either `not_before` or the finish of some
//! reservation, so only those candidates are tried.
//!
//! # Complexity
//! O(r² log r) per search, r = reservations on the contractor.
//!
//! # Reference
//! Kolisch (1996), serial schedule generation scheme with resource profiles

use super::Timeline;
use crate::models::{saturating_add, Time, WorkerCount};

/// Committed interval `[start, finish)` holding `count` workers.
type Reservation = (Time, Time, WorkerCount);

/// Reservation profile per contractor and worker type.
#[derive(Debug, Clone)]
pub struct WindowTimeline {
    /// `reservations[contractor][worker_type]`, in commit order.
    reservations: Vec<Vec<Vec<Reservation>>>,
    capacities: Vec<Vec<WorkerCount>>,
}

impl WindowTimeline {
    /// Creates an empty profile: every worker is free at all times.
    pub fn new(capacities: Vec<Vec<WorkerCount>>) -> Self {
        let reservations = capacities
            .iter()
            .map(|row| vec![Vec::new(); row.len()])
            .collect();
        Self {
            reservations,
            capacities,
        }
    }

    /// Peak number of workers of a type in use over `[from, to)`.
    pub fn peak_usage(
        &self,
        contractor: usize,
        worker_type: usize,
        from: Time,
        to: Time,
    ) -> WorkerCount {
        let Some(reserved) = self
            .reservations
            .get(contractor)
            .and_then(|row| row.get(worker_type))
        else {
            return 0;
        };

        // Releases sort before acquisitions at equal times.
        let mut events: Vec<(Time, i64)> = Vec::new();
        for &(start, finish, count) in reserved {
            if start < to && finish > from {
                events.push((start.max(from), i64::from(count)));
                events.push((finish, -i64::from(count)));
            }
        }
        events.sort_unstable();

        let mut in_use: i64 = 0;
        let mut peak: i64 = 0;
        for (_, delta) in events {
            in_use += delta;
            peak = peak.max(in_use);
        }
        WorkerCount::try_from(peak).unwrap_or(WorkerCount::MAX)
    }

    fn fits(&self, contractor: usize, workers: &[WorkerCount], from: Time, to: Time) -> bool {
        if to <= from {
            return true;
        }
        workers.iter().enumerate().all(|(worker_type, &requested)| {
            let capacity = self.capacities[contractor][worker_type];
            requested == 0
                || self
                    .peak_usage(contractor, worker_type, from, to)
                    .saturating_add(requested)
                    <= capacity
        })
    }
}

impl Timeline for WindowTimeline {
    fn capacities(&self) -> &[Vec<WorkerCount>] {
        &self.capacities
    }

    fn find_start(
        &self,
        contractor: usize,
        workers: &[WorkerCount],
        not_before: Time,
        duration: Time,
    ) -> Time {
        let mut candidates = vec![not_before];
        for (worker_type, &requested) in workers.iter().enumerate() {
            if requested == 0 {
                continue;
            }
            candidates.extend(
                self.reservations[contractor][worker_type]
                    .iter()
                    .map(|&(_, finish, _)| finish)
                    .filter(|&finish| finish > not_before),
            );
        }
        candidates.sort_unstable();
        candidates.dedup();

        // After the last finish nothing is reserved, so the search always
        // succeeds for a request within capacity.
        let latest = candidates.last().copied().unwrap_or(not_before);
        candidates
            .into_iter()
            .find(|&t| self.fits(contractor, workers, t, saturating_add(t, duration)))
            .unwrap_or(latest)
    }

    fn commit(&mut self, contractor: usize, workers: &[WorkerCount], start: Time, finish: Time) {
        if finish <= start {
            return;
        }
        for (worker_type, &count) in workers.iter().enumerate() {
            if count > 0 {
                self.reservations[contractor][worker_type].push((start, finish, count));
            }
        }
    }
}
