use crate::{
    centroid::{self, Centroid, Color},
    MOVEMENT_THRESHOLD,
};

/// Why a clustering run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stop {
    /// No centroid moved further than [`MOVEMENT_THRESHOLD`] since the previous check.
    Converged,
    /// The maximum iteration count was reached, regardless of movement.
    IterationLimit,
}

/// Outcome of a single convergence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Continue,
    Stop(Stop),
}

/// Remembers where every centroid was at the previous check and counts the checks performed.
///
/// Snapshots are matched to centroids by index, so the centroid slice must keep a stable order for the lifetime of the
/// tracker. If its length changes the snapshot starts over.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    previous: Option<Vec<Color>>,
    iteration: usize,
    max_iterations: usize,
}

impl ConvergenceTracker {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            previous: None,
            iteration: 0,
            max_iterations,
        }
    }

    /// Number of checks performed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Compare the centroids against the previous snapshot and record their current colors.
    ///
    /// The first check only records the snapshot and asks to continue. A centroid slice whose length differs from the
    /// snapshot is treated the same way, since there is nothing to compare it against. Once the iteration count reaches
    /// the maximum the check always stops, even if some centroid is still moving.
    pub fn check(&mut self, centroids: &[Centroid]) -> Status {
        self.iteration += 1;

        let moved = if let Some(previous) = self.previous.as_mut().filter(|previous| previous.len() == centroids.len()) {
            let mut moved = false;
            for (snapshot, centroid) in previous.iter_mut().zip(centroids) {
                if centroid::distance(centroid.color(), *snapshot) > MOVEMENT_THRESHOLD {
                    moved = true;
                }

                *snapshot = centroid.color();
            }

            moved
        } else {
            self.previous = Some(centroids.iter().map(Centroid::color).collect());
            true
        };

        if self.iteration >= self.max_iterations {
            Status::Stop(Stop::IterationLimit)
        } else if moved {
            Status::Continue
        } else {
            Status::Stop(Stop::Converged)
        }
    }
}
