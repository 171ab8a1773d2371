/*
 * Spawn Scheduler Module
 *
 * The growth of the web is planned once, up front: a list of spawn times that
 * arrive in small bursts, followed by one last web pass. The plan lives in a
 * min-heap keyed by fire time and insertion order, and is drained against a
 * clock that only advances while the simulation runs.
 */

use rand::Rng;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

const FIRST_SPAWN_MS: u64 = 20;
const BATCH_SPACING_MS: u64 = 3;
const BATCH_GAP_MS: std::ops::RangeInclusive<u64> = 10..=21;
const FINAL_PASS_DELAY_MS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnAction {
    Spawn,
    WebPass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnEvent {
    pub fire_at: Duration,
    pub sequence: u64,
    pub action: SpawnAction,
}

impl Ord for SpawnEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for SpawnEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Produces exactly `count` non-decreasing spawn delays, in bursts of one or
/// two spawns 3ms apart, plus the base offset reached after the last burst.
pub fn spawn_delays<R: Rng + ?Sized>(rng: &mut R, count: usize) -> (Vec<Duration>, Duration) {
    let mut delays = Vec::with_capacity(count);
    let mut base = FIRST_SPAWN_MS;

    while delays.len() < count {
        let batch_size = rng.gen_range(1..=2);
        for k in 0..batch_size {
            if delays.len() == count {
                break;
            }
            delays.push(Duration::from_millis(base + k * BATCH_SPACING_MS));
        }
        base += rng.gen_range(BATCH_GAP_MS);
    }

    (delays, Duration::from_millis(base))
}

#[derive(Debug, Default)]
pub struct SpawnScheduler {
    queue: BinaryHeap<Reverse<SpawnEvent>>,
    next_sequence: u64,
    clock: Duration,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // The full growth plan for a web of `max_threads` threads
    pub fn with_growth_plan<R: Rng + ?Sized>(rng: &mut R, max_threads: usize) -> Self {
        let mut scheduler = Self::new();
        let (delays, end) = spawn_delays(rng, max_threads);

        for delay in delays {
            scheduler.schedule(delay, SpawnAction::Spawn);
        }
        scheduler.schedule(end + Duration::from_millis(FINAL_PASS_DELAY_MS), SpawnAction::WebPass);

        scheduler
    }

    pub fn schedule(&mut self, fire_at: Duration, action: SpawnAction) {
        self.queue.push(Reverse(SpawnEvent {
            fire_at,
            sequence: self.next_sequence,
            action,
        }));
        self.next_sequence += 1;
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_fire_time(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(event)| event.fire_at)
    }

    // Move the clock forward and return whatever became due
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SpawnAction> {
        self.clock += elapsed;
        self.drain_due(self.clock)
    }

    /// Pops every event due at `now`, earliest first; equal times keep the
    /// order they were scheduled in.
    pub fn drain_due(&mut self, now: Duration) -> Vec<SpawnAction> {
        let mut due = Vec::new();
        while let Some(Reverse(event)) = self.queue.peek() {
            if event.fire_at > now {
                break;
            }
            due.push(event.action);
            self.queue.pop();
        }
        due
    }
}
