//! Progress reporting across dataset loads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Called once per item fetched.
pub trait ProgressStep: Send + Sync {
    fn step(&self);
}

/// Receives the overall completed fraction in `[0, 1]`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, fraction: f64);
}

/// Ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressStep for NoProgress {
    fn step(&self) {}
}

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f64) {}
}

impl<F: Fn() + Send + Sync> ProgressStep for F {
    fn step(&self) {
        self()
    }
}

impl<F: Fn(f64) + Send + Sync> ProgressReporter for F {
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Turns item steps from several datasets into one fraction.
///
/// Reported fractions never decrease, even when steps from concurrent
/// loads interleave, and are clamped to 1 if more steps arrive than
/// announced.
pub struct ProgressTracker<'r> {
    total: usize,
    completed: AtomicUsize,
    last: Mutex<f64>,
    reporter: &'r dyn ProgressReporter,
}

impl<'r> ProgressTracker<'r> {
    pub fn new(total: usize, reporter: &'r dyn ProgressReporter) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            last: Mutex::new(0.0),
            reporter,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressStep for ProgressTracker<'_> {
    fn step(&self) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if self.total == 0 {
            return;
        }
        let fraction = (done as f64 / self.total as f64).clamp(0.0, 1.0);

        // Report under the lock so reports leave in the order they are decided
        if let Ok(mut last) = self.last.lock() {
            if fraction >= *last {
                *last = fraction;
                self.reporter.report(fraction);
            }
        }
    }
}
