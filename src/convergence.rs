use crate::color::Color;

/// Outcome of a convergence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Continue,
    Stop,
}

/// Snapshot of one completed iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationState {
    /// 1-based iteration number.
    pub iteration: u32,
    pub previous: Vec<Color>,
    pub updated: Vec<Color>,
    /// Aggregate cluster drift, RMSE × 100.
    pub rmse: f64,
    /// Pixels assigned to each cluster during this iteration.
    pub counts: Vec<u64>,
}

/// Aggregate drift between two cluster lists: `100 * sqrt(mean_i(rmse(prev_i, new_i)²))`.
///
/// Both lists must have the same length and ordering.
pub fn cluster_drift(previous: &[Color], updated: &[Color]) -> f64 {
    debug_assert_eq!(previous.len(), updated.len());
    if previous.is_empty() {
        return 0.0;
    }
    let sum: f64 = previous
        .iter()
        .zip(updated)
        .map(|(&p, &u)| p.mean_sq_diff(u) as f64)
        .sum();
    100.0 * (sum / previous.len() as f64).sqrt()
}

/// Stop once drift is strictly below the threshold, or is exactly zero.
///
/// Zero drift means every cluster color is unchanged, so further iterations
/// cannot move anything even when `threshold` is zero.
pub fn check(rmse: f64, threshold: f64) -> Convergence {
    if rmse < threshold || rmse == 0.0 {
        Convergence::Stop
    } else {
        Convergence::Continue
    }
}
