use serde::Serialize;

/// Per-signal features used for scoring.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureSet {
    /// Spectral snapshot: linear FFT magnitudes of a single frame (fft_size / 2 bins)
    pub pitch_data: Vec<f32>,
    /// RMS per fixed-size sample window, in order
    pub amplitude_data: Vec<f32>,
    /// Seconds
    pub duration: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Score reported to the player: the amplitude sub-score, rounded (0-100)
    pub score: u32,
    /// Weighted blend of all three sub-scores, rounded (0-100). Informational.
    pub composite: u32,
    pub duration_match: f32,
    pub pitch_match: f32,
    pub amplitude_match: f32,
}

impl ComparisonResult {
    /// Result for an attempt with no usable sound.
    pub fn silent() -> Self {
        Self {
            score: 0,
            composite: 0,
            duration_match: 0.0,
            pitch_match: 0.0,
            amplitude_match: 0.0,
        }
    }
}
