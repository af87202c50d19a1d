//! # Pitch Detection Module
//!
//! Estimates the fundamental frequency of a single monophonic note with the
//! YIN algorithm, restricted to the working range of the instrument.
//!
//! ## Features
//! - RMS noise gate to reject silence and the noise floor
//! - Cumulative-mean-normalized difference function
//! - First-dip selection to avoid locking onto sub-harmonics
//! - Deepest-dip fallback for breathy, weakly periodic tones
//! - Parabolic interpolation for sub-sample accuracy
//! - Range gate so every valid estimate lies inside [min, max] Hz

use serde::{Deserialize, Serialize};

/// Lowest frequency the estimator reports by default.
pub const DEFAULT_MIN_FREQUENCY: f32 = 200.0;

/// Highest frequency the estimator reports by default.
pub const DEFAULT_MAX_FREQUENCY: f32 = 2200.0;

/// Default RMS below which a buffer is treated as silence.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.01;

/// Default absolute threshold on `d'(τ)` for the first-dip search.
pub const DEFAULT_YIN_THRESHOLD: f32 = 0.1;

/// Relative slack at the range bounds for interpolation error.
const RANGE_TOLERANCE: f32 = 0.001;

/// Smallest lag with a real left neighbour (`d'(0)` is fixed at 1).
const FIRST_USABLE_LAG: usize = 2;

/// An immutable window of samples handed to the pipeline for one tick.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    /// Time-domain samples, roughly in [-1, 1].
    pub samples: &'a [f32],
    /// Sample rate at capture time, in Hz.
    pub sample_rate: u32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Root-mean-square level of the frame. Zero for an empty frame.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let energy = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>();
        (energy / self.samples.len() as f64).sqrt() as f32
    }
}

/// Result of pitch estimation for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// Estimated fundamental in Hz, 0.0 when not valid.
    pub frequency_hz: f32,
    /// Whether a pitch inside the accepted range was found.
    pub valid: bool,
    /// `d'(τ)` at the chosen lag; lower means more periodic.
    pub aperiodicity: f32,
}

impl PitchEstimate {
    /// The "no pitch" estimate.
    pub fn none() -> Self {
        Self::default()
    }

    /// The frequency when the estimate is valid.
    pub fn frequency(&self) -> Option<f32> {
        self.valid.then_some(self.frequency_hz)
    }
}

/// YIN pitch estimator.
///
/// Stateless between calls: the same frame always yields the same estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEstimator {
    min_frequency: f32,
    max_frequency: f32,
    silence_threshold: f32,
    yin_threshold: f32,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            yin_threshold: DEFAULT_YIN_THRESHOLD,
        }
    }
}

impl PitchEstimator {
    /// Creates an estimator for a custom range and thresholds.
    ///
    /// Values are expected to have gone through
    /// [`TunerConfig::validate`](crate::config::TunerConfig::validate).
    pub fn new(
        min_frequency: f32,
        max_frequency: f32,
        silence_threshold: f32,
        yin_threshold: f32,
    ) -> Self {
        Self {
            min_frequency,
            max_frequency,
            silence_threshold,
            yin_threshold,
        }
    }

    /// Estimates the fundamental frequency of a frame.
    ///
    /// # Arguments
    /// * `frame` - Samples and sample rate for this tick
    ///
    /// # Returns
    /// * `PitchEstimate` - `valid` with a frequency in range, or "no pitch"
    ///   for silence, noise, degenerate buffers and out-of-range periodicity
    pub fn estimate(&self, frame: &AudioFrame<'_>) -> PitchEstimate {
        let signal = frame.samples;
        if signal.is_empty() || frame.sample_rate == 0 {
            return PitchEstimate::none();
        }

        // --- Noise Gate: RMS to filter out silence/noise ---
        let rms = frame.rms();
        if !rms.is_finite() || rms < self.silence_threshold {
            return PitchEstimate::none();
        }

        let sample_rate = frame.sample_rate as f32;
        let Some((min_lag, max_lag)) = self.lag_bounds(sample_rate, signal.len()) else {
            return PitchEstimate::none();
        };

        // --- Difference function and cumulative mean normalization ---
        // One extra lag past max_lag so the last candidate has a right neighbour.
        let diff = difference_function(signal, max_lag + 1);
        let cmnd = cumulative_mean_normalize(&diff);

        // --- First dip below the absolute threshold ---
        // The scan starts below min_lag so that a tone above the range is seen
        // at its own period and rejected, instead of at twice its period.
        let tau = match self.first_dip(&cmnd, FIRST_USABLE_LAG, max_lag) {
            Some(tau) => tau,
            None => match deepest_dip(&cmnd, min_lag, max_lag) {
                Some(tau) => tau,
                None => return PitchEstimate::none(),
            },
        };

        // --- Parabolic interpolation for better precision ---
        // Refined on the raw difference; d' is skewed by its running mean.
        let refined = parabolic_interpolation(&diff, tau);
        let frequency = sample_rate / refined;

        let Some(frequency) = self.gate(frequency) else {
            log::trace!("Rejected out-of-range periodicity at {:.1} Hz", frequency);
            return PitchEstimate::none();
        };

        PitchEstimate {
            frequency_hz: frequency,
            valid: true,
            aperiodicity: cmnd[tau],
        }
    }

    /// Keeps a frequency inside `[min, max]`.
    ///
    /// Estimates within `RANGE_TOLERANCE` of a bound are pulled onto it, so a
    /// tone sitting exactly on a bound survives interpolation error.
    fn gate(&self, frequency: f32) -> Option<f32> {
        let low = self.min_frequency * (1.0 - RANGE_TOLERANCE);
        let high = self.max_frequency * (1.0 + RANGE_TOLERANCE);
        (frequency.is_finite() && frequency >= low && frequency <= high)
            .then(|| frequency.clamp(self.min_frequency, self.max_frequency))
    }

    /// Lag search range `[min_lag, max_lag]` for a buffer.
    ///
    /// The lower bound never drops below 2 so `τ - 1` stays a real lag; the
    /// upper bound is clamped so that `τ + 1` plus the comparison window fits
    /// inside the buffer.
    fn lag_bounds(&self, sample_rate: f32, len: usize) -> Option<(usize, usize)> {
        let min_lag = ((sample_rate / self.max_frequency).floor() as usize).max(FIRST_USABLE_LAG);
        let max_lag = (sample_rate / self.min_frequency).ceil() as usize;
        let max_lag = max_lag.min((len / 2).saturating_sub(1));

        (max_lag > min_lag).then_some((min_lag, max_lag))
    }

    fn first_dip(&self, cmnd: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
        (min_lag..=max_lag).find(|&tau| cmnd[tau] < self.yin_threshold && is_local_minimum(cmnd, tau))
    }
}

/// Computes the difference function `d(τ)` for `τ` in `0..=last_lag`.
///
/// Sums over a fixed window of `len - last_lag` samples so every lag compares
/// the same number of pairs.
fn difference_function(signal: &[f32], last_lag: usize) -> Vec<f32> {
    let window = signal.len() - last_lag;
    (0..=last_lag)
        .map(|tau| {
            let mut diff = 0.0_f64;
            for i in 0..window {
                let delta = (signal[i] - signal[i + tau]) as f64;
                diff += delta * delta;
            }
            diff as f32
        })
        .collect()
}

/// Cumulative mean normalized difference `d'(τ)`, with `d'(0) = 1`.
fn cumulative_mean_normalize(diff: &[f32]) -> Vec<f32> {
    let mut running_sum = 0.0_f64;
    diff.iter()
        .enumerate()
        .map(|(tau, &d)| {
            if tau == 0 {
                return 1.0;
            }
            running_sum += d as f64;
            if running_sum > 0.0 {
                (d as f64 * tau as f64 / running_sum) as f32
            } else {
                1.0
            }
        })
        .collect()
}

/// Lowest local minimum of `d'` in the search range.
///
/// A monotone `d'` has no dip and yields `None`; the edge of the search range
/// is never mistaken for a period.
fn deepest_dip(cmnd: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
    (min_lag..=max_lag)
        .filter(|&tau| is_local_minimum(cmnd, tau))
        .min_by(|&a, &b| cmnd[a].total_cmp(&cmnd[b]))
}

fn is_local_minimum(cmnd: &[f32], tau: usize) -> bool {
    cmnd[tau].is_finite() && cmnd[tau] < cmnd[tau - 1] && cmnd[tau] < cmnd[tau + 1]
}

/// Fits a parabola through `d(τ-1), d(τ), d(τ+1)` and returns its vertex.
fn parabolic_interpolation(diff: &[f32], tau: usize) -> f32 {
    let y1 = diff[tau - 1];
    let y2 = diff[tau];
    let y3 = diff[tau + 1];

    let curvature = y1 - 2.0 * y2 + y3;
    if curvature.abs() > f32::EPSILON {
        let shift = ((y1 - y3) / (2.0 * curvature)).clamp(-1.0, 1.0);
        tau as f32 + shift
    } else {
        tau as f32
    }
}
