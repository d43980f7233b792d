//! Scoring an attempt's features against a reference.
//!
//! Both spectrum and envelope go through the same array comparison: truncate
//! to the common prefix, peak-normalize each side, and average the absolute
//! difference over the points where either side carries meaningful energy.
//! Every division here is guarded; no NaN or infinity reaches a result.

use super::features::{ComparisonResult, FeatureSet};
use crate::config::ScoringConfig;

pub fn compare(reference: &FeatureSet, attempt: &FeatureSet) -> ComparisonResult {
    compare_with(reference, attempt, &ScoringConfig::default())
}

pub fn compare_with(
    reference: &FeatureSet,
    attempt: &FeatureSet,
    config: &ScoringConfig,
) -> ComparisonResult {
    let attempt_level = average_amplitude(&attempt.amplitude_data);
    // A NaN level also lands here.
    if !(attempt_level >= config.silence_threshold) {
        log::debug!(
            "Attempt is silent (mean amplitude {:.4} < {}), scoring 0",
            attempt_level,
            config.silence_threshold
        );
        return ComparisonResult::silent();
    }

    let duration_match = duration_match(reference.duration, attempt.duration);
    let pitch_match = compare_arrays(
        &reference.pitch_data,
        &attempt.pitch_data,
        config.significance_threshold,
    );
    let amplitude_match = compare_arrays(
        &reference.amplitude_data,
        &attempt.amplitude_data,
        config.significance_threshold,
    );

    let blended = duration_match * config.duration_weight
        + pitch_match * config.pitch_weight
        + amplitude_match * config.amplitude_weight;

    log::debug!(
        "Sub-scores: duration={:.1} pitch={:.1} amplitude={:.1} composite={:.1}",
        duration_match,
        pitch_match,
        amplitude_match,
        blended
    );

    ComparisonResult {
        score: to_percent(amplitude_match),
        composite: to_percent(blended),
        duration_match,
        pitch_match,
        amplitude_match,
    }
}

/// Mean absolute value; 0 for an empty slice.
pub fn average_amplitude(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f32>() / values.len() as f32
}

/// 100 at equal durations, falling linearly with the relative difference,
/// floored at 0. A zero-length reference only matches a zero-length attempt.
pub fn duration_match(reference: f32, attempt: f32) -> f32 {
    if reference == 0.0 {
        return if attempt == 0.0 { 100.0 } else { 0.0 };
    }
    // f32::max drops a NaN operand, so a non-finite ratio floors to 0
    (100.0 - ((reference - attempt).abs() / reference) * 100.0).max(0.0)
}

/// Divide by the array's own maximum. Left unchanged when the maximum is 0
/// or not finite (which covers the empty array).
pub fn normalize(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == 0.0 || !max.is_finite() {
        return values.to_vec();
    }
    values.iter().map(|v| v / max).collect()
}

/// Similarity of two arrays over their common prefix, 0-100.
///
/// Returns 0 when no index is significant in either array.
pub fn compare_arrays(a: &[f32], b: &[f32], significance: f32) -> f32 {
    let len = a.len().min(b.len());
    let norm_a = normalize(&a[..len]);
    let norm_b = normalize(&b[..len]);

    let (total_diff, significant_points) = norm_a
        .iter()
        .zip(norm_b.iter())
        .filter(|(x, y)| **x > significance || **y > significance)
        .fold((0.0f32, 0usize), |(total, count), (x, y)| {
            (total + (x - y).abs(), count + 1)
        });

    if significant_points == 0 {
        return 0.0;
    }
    (100.0 - (total_diff / significant_points as f32) * 100.0).max(0.0)
}

fn to_percent(value: f32) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}
