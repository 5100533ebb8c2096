//! Knee-point detection on descending score curves.
//!
//! Implements the Kneedle procedure for a convex, decreasing curve: both
//! axes are normalized to [0, 1], the curve is flipped so it becomes
//! concave increasing, and knee candidates are the interior local maxima
//! of the difference between the flipped curve and the diagonal. A
//! candidate is confirmed once the difference later drops far enough below
//! its peak; the first confirmed candidate wins.

/// Kneedle sensitivity: a candidate is confirmed when the difference curve
/// falls below `peak - SENSITIVITY * mean(dx)`.
const SENSITIVITY: f64 = 1.0;

/// Find the elbow index of a descending score curve.
///
/// Returns `None` when no distinct knee exists: fewer than three points,
/// a flat curve, or near-linear decay.
pub fn find_elbow(values: &[f64]) -> Option<usize> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let y_min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(y_max - y_min).is_finite() || y_max <= y_min {
        return None;
    }

    let step = 1.0 / (n - 1) as f64;
    // Flip the normalized curve vertically; a convex decreasing input
    // becomes concave increasing, with knees at maxima of (y - x).
    let diff: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let y_norm = (y - y_min) / (y_max - y_min);
            (1.0 - y_norm) - i as f64 * step
        })
        .collect();

    let mut candidate: Option<usize> = None;
    let mut threshold = 0.0;
    for i in 1..n {
        let is_local_max = i + 1 < n && diff[i] > diff[i - 1] && diff[i] > diff[i + 1];
        if is_local_max {
            // A new local maximum supersedes an unconfirmed candidate.
            candidate = Some(i);
            threshold = diff[i] - SENSITIVITY * step;
        } else if let Some(knee) = candidate {
            if diff[i] < threshold {
                return Some(knee);
            }
        }
    }
    None
}
