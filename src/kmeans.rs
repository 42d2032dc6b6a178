//! The assignment / update / convergence loop.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::assign::{AssignmentMap, assign};
use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::convergence::{Convergence, IterationState, check, cluster_drift};
use crate::render::render;
use crate::update::update_means;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Drift fell below the convergence threshold.
    Converged,
    /// `max_iters` iterations ran without converging.
    MaxItersReached,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Callbacks for seed, per-iteration and final cluster colors.
///
/// All methods default to no-ops.
pub trait Observer {
    fn seeded(&mut self, _seeds: &[Color]) {}
    fn iteration(&mut self, _state: &IterationState) {}
    fn finished(&mut self, _clusters: &[Color], _termination: Termination) {}
}

impl Observer for () {}

/// Loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopParams {
    pub max_iters: u32,
    /// Stop threshold on RMSE × 100.
    pub convergence: f64,
}

/// Final state of a clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub clusters: Vec<Color>,
    pub counts: Vec<u64>,
    pub assignments: AssignmentMap,
    /// Completed iterations.
    pub iterations: u32,
    /// Drift of the last completed iteration, RMSE × 100.
    pub rmse: f64,
    pub termination: Termination,
}

impl Clustering {
    /// Render the segmented image from the final assignment.
    pub fn render(&self, buffer: &PixelBuffer) -> PixelBuffer {
        render(buffer, &self.assignments, &self.clusters)
    }

    /// Clusters that received at least one pixel.
    pub fn nonempty_clusters(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Run k-means from `seeds` until convergence, the iteration cap, or cancellation.
///
/// `seeds` must hold at least two colors and `params.max_iters` must be
/// positive; configuration validation guarantees both. The first assignment
/// always runs, so the result covers every pixel even when `cancel` is already
/// raised. After that the flag is polled between the assignment and update
/// steps; a cancelled run keeps the last completed assignment.
///
/// # Panics
///
/// Panics if `seeds` holds fewer than two colors or `params.max_iters` is 0.
pub fn run(
    buffer: &PixelBuffer,
    seeds: Vec<Color>,
    params: LoopParams,
    observer: &mut dyn Observer,
    cancel: Option<&AtomicBool>,
) -> Clustering {
    assert!(seeds.len() >= 2, "k-means needs at least 2 seeds, got {}", seeds.len());
    assert!(params.max_iters > 0, "max_iters must be positive");

    let cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
    let k = seeds.len();

    observer.seeded(&seeds);
    info!("clustering {} pixels into {k} clusters", buffer.len());

    let mut clusters = seeds;
    let mut iterations = 0u32;
    let mut rmse = 0.0f64;
    let mut map = assign(buffer, &clusters);

    let (termination, counts) = loop {
        if cancelled() {
            break (Termination::Cancelled, map.counts(k));
        }

        let update = update_means(buffer, &map, &clusters);
        iterations += 1;
        rmse = cluster_drift(&clusters, &update.colors);
        let counts = update.counts;

        let previous = std::mem::replace(&mut clusters, update.colors);
        let state = IterationState {
            iteration: iterations,
            previous,
            updated: clusters.clone(),
            rmse,
            counts: counts.clone(),
        };
        debug!(
            "iteration={iterations} 100*rmse={rmse} empty_clusters={}",
            counts.iter().filter(|&&c| c == 0).count()
        );
        observer.iteration(&state);

        if check(rmse, params.convergence) == Convergence::Stop {
            break (Termination::Converged, counts);
        }
        if iterations >= params.max_iters {
            break (Termination::MaxItersReached, counts);
        }

        let next = assign(buffer, &clusters);
        debug!("{} pixels changed cluster", next.changed_from(&map));
        map = next;
    };

    let clustering = Clustering {
        clusters,
        counts,
        assignments: map,
        iterations,
        rmse,
        termination,
    };
    info!(
        "{termination:?} after {iterations} iterations, 100*rmse={rmse}, {} of {k} clusters used",
        clustering.nonempty_clusters()
    );
    observer.finished(&clustering.clusters, termination);
    clustering
}
