use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::{AudioSignal, DecodeError};
use super::features::FeatureSet;
use crate::config::AnalysisConfig;

pub fn extract(signal: &AudioSignal) -> Result<FeatureSet, DecodeError> {
    extract_with(signal, &AnalysisConfig::default())
}

/// Build the feature set for one signal from channel 0.
///
/// The input is never modified. Fails when there is nothing to analyze:
/// no channel 0, an empty channel 0, or an unknown sample rate.
pub fn extract_with(signal: &AudioSignal, config: &AnalysisConfig) -> Result<FeatureSet, DecodeError> {
    if signal.sample_rate() == 0 {
        return Err(DecodeError::UnknownSampleRate);
    }
    let samples = signal.channel(0)?;
    if samples.is_empty() {
        return Err(DecodeError::NoSamples);
    }

    let pitch_data = spectral_snapshot(samples, config.fft_size);
    let amplitude_data = amplitude_envelope(samples, config.window_size);
    let duration = signal.duration();

    log::debug!(
        "Extracted features: {} spectrum bins, {} envelope windows, {:.2}s",
        pitch_data.len(),
        amplitude_data.len(),
        duration
    );

    Ok(FeatureSet {
        pitch_data,
        amplitude_data,
        duration,
    })
}

/// Magnitude spectrum of a single Hann-windowed frame centered on the middle
/// of `samples`. Short inputs are zero-padded. Always returns `fft_size / 2`
/// bins; sizes below 2 are treated as 2.
///
/// This is one static frame, not a pitch track over time.
pub fn spectral_snapshot(samples: &[f32], fft_size: usize) -> Vec<f32> {
    let fft_size = fft_size.max(2);
    let half = fft_size / 2;

    let start = (samples.len() / 2).saturating_sub(half);
    let end = (start + fft_size).min(samples.len());
    let hann = hann_window(fft_size);

    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); fft_size];
    for (i, &s) in samples[start..end].iter().enumerate() {
        buffer[i] = Complex::new(s * hann[i], 0.0);
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    buffer[..half].iter().map(|c| c.norm()).collect()
}

/// RMS of consecutive non-overlapping windows. The trailing partial window
/// is averaged over its own length. A window size of 0 is treated as 1.
pub fn amplitude_envelope(samples: &[f32], window_size: usize) -> Vec<f32> {
    samples
        .chunks(window_size.max(1))
        .map(|chunk| (chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32).sqrt())
        .collect()
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn envelope_length_is_ceil_of_windows() {
        for len in [1usize, 1023, 1024, 1025, 4096, 5000] {
            let env = amplitude_envelope(&vec![0.3; len], 1024);
            assert_eq!(env.len(), (len + 1023) / 1024, "len {}", len);
        }
    }

    #[test]
    fn envelope_is_non_negative() {
        let samples = sine(440.0, 44100, 10_000, 0.8);
        let env = amplitude_envelope(&samples, 1024);
        assert!(env.iter().all(|&v| v >= 0.0));
        let negative = vec![-0.5f32; 3000];
        assert!(amplitude_envelope(&negative, 1024).iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn partial_window_uses_its_own_length() {
        // 1024 zeros then 10 samples of 0.5: last window RMS must be 0.5, not diluted
        let mut samples = vec![0.0f32; 1024];
        samples.extend(std::iter::repeat(0.5).take(10));
        let env = amplitude_envelope(&samples, 1024);
        assert_eq!(env, vec![0.0, 0.5]);
    }

    #[test]
    fn snapshot_has_half_fft_bins() {
        assert_eq!(spectral_snapshot(&vec![0.1; 100], 2048).len(), 1024);
        assert_eq!(spectral_snapshot(&vec![0.1; 100_000], 2048).len(), 1024);
        assert_eq!(spectral_snapshot(&vec![0.1; 100], 512).len(), 256);
    }

    #[test]
    fn snapshot_peaks_at_tone_frequency() {
        let sample_rate = 44100;
        let samples = sine(1000.0, sample_rate, 44100, 0.5);
        let bins = spectral_snapshot(&samples, 2048);

        let peak = bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // 1000 Hz / (44100 / 2048) ≈ bin 46.4
        assert!((45..=47).contains(&peak), "peak at bin {}", peak);
    }

    #[test]
    fn extract_reports_duration_and_shapes() {
        let signal = AudioSignal::mono(sine(220.0, 8000, 8000, 0.5), 8000);
        let features = extract(&signal).unwrap();

        assert_eq!(features.pitch_data.len(), 1024);
        assert_eq!(features.amplitude_data.len(), 8);
        assert!((features.duration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn extract_uses_channel_zero_only() {
        let left = vec![0.5f32; 2048];
        let right = vec![0.0f32; 2048];
        let signal = AudioSignal::new(vec![left, right], 44100);
        let features = extract(&signal).unwrap();
        assert!(features.amplitude_data.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn extract_does_not_touch_input() {
        let samples = sine(330.0, 16000, 5000, 0.7);
        let signal = AudioSignal::mono(samples.clone(), 16000);
        extract(&signal).unwrap();
        assert_eq!(signal.channel(0).unwrap(), samples.as_slice());
    }

    #[test]
    fn extract_rejects_unreadable_signals() {
        let empty = AudioSignal::mono(Vec::new(), 44100);
        assert!(matches!(extract(&empty), Err(DecodeError::NoSamples)));

        let no_channels = AudioSignal::new(Vec::new(), 44100);
        assert!(matches!(extract(&no_channels), Err(DecodeError::MissingChannel(0))));

        let no_rate = AudioSignal::mono(vec![0.1; 10], 0);
        assert!(matches!(extract(&no_rate), Err(DecodeError::UnknownSampleRate)));
    }

    #[test]
    fn custom_window_size() {
        let signal = AudioSignal::mono(vec![0.2; 1000], 1000);
        let config = AnalysisConfig {
            fft_size: 256,
            window_size: 100,
        };
        let features = extract_with(&signal, &config).unwrap();
        assert_eq!(features.amplitude_data.len(), 10);
        assert_eq!(features.pitch_data.len(), 128);
    }
}
