//! # Level Meter Module
//!
//! Reduces a raw sample buffer to a fixed number of bar heights for an
//! amplitude display. Runs independently of pitch detection.

/// Default number of bars.
pub const DEFAULT_BAR_COUNT: usize = 32;

/// Height of a bar for a silent segment.
pub const MIN_BAR_HEIGHT: u8 = 5;

/// Maximum height a bar can add on top of [`MIN_BAR_HEIGHT`].
const MAX_BAR_RISE: u32 = 50;

/// Scale from mean absolute amplitude to bar rise.
const LEVEL_GAIN: f32 = 150.0;

/// Computes bar heights for a sample buffer.
///
/// The buffer is cut into `bar_count` contiguous segments of
/// `samples.len() / bar_count` samples each; leftover samples at the end are
/// ignored. Each segment's mean absolute value maps to
/// `5 + min(50, floor(mean * 150))`, so every height lies in [5, 55].
///
/// # Arguments
/// * `samples` - Time-domain audio samples
/// * `bar_count` - Number of bars to produce
///
/// # Returns
/// * `Vec<u8>` - Exactly `bar_count` heights
pub fn compute_levels(samples: &[f32], bar_count: usize) -> Vec<u8> {
    if bar_count == 0 {
        return Vec::new();
    }

    let segment_len = samples.len() / bar_count;
    if segment_len == 0 {
        return vec![MIN_BAR_HEIGHT; bar_count];
    }

    samples
        .chunks_exact(segment_len)
        .take(bar_count)
        .map(|segment| {
            let mean = segment.iter().map(|s| s.abs()).sum::<f32>() / segment_len as f32;
            bar_height(mean)
        })
        .collect()
}

fn bar_height(mean: f32) -> u8 {
    // NaN and negative means collapse to the floor height.
    let rise = (mean * LEVEL_GAIN).floor();
    let rise = if rise.is_finite() && rise > 0.0 {
        (rise as u32).min(MAX_BAR_RISE)
    } else if rise == f32::INFINITY {
        MAX_BAR_RISE
    } else {
        0
    };
    MIN_BAR_HEIGHT + rise as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_flat() {
        let levels = compute_levels(&[0.0; 2048], DEFAULT_BAR_COUNT);
        assert_eq!(levels.len(), 32);
        assert!(levels.iter().all(|&h| h == 5));
    }

    #[test]
    fn test_full_scale_saturates() {
        let levels = compute_levels(&[1.0; 2048], DEFAULT_BAR_COUNT);
        assert!(levels.iter().all(|&h| h == 55));

        let negative = compute_levels(&[-0.9; 2048], DEFAULT_BAR_COUNT);
        assert!(negative.iter().all(|&h| h == 55));
    }

    #[test]
    fn test_mean_mapping() {
        // mean 0.125 -> floor(18.75) = 18 -> 23
        let levels = compute_levels(&[0.125; 64], 32);
        assert!(levels.iter().all(|&h| h == 23));
    }

    #[test]
    fn test_segments_are_independent() {
        let mut samples = vec![0.0_f32; 64];
        for s in samples[32..].iter_mut() {
            *s = -0.25;
        }
        let levels = compute_levels(&samples, 2);
        assert_eq!(levels, vec![5, 42]);
    }

    #[test]
    fn test_remainder_is_dropped() {
        // 65 samples over 2 bars: segments of 32, the last sample never read.
        let mut samples = vec![0.0_f32; 65];
        samples[64] = 1.0;
        let levels = compute_levels(&samples, 2);
        assert_eq!(levels, vec![5, 5]);
    }

    #[test]
    fn test_short_and_empty_buffers() {
        assert_eq!(compute_levels(&[], 32), vec![5; 32]);
        assert_eq!(compute_levels(&[0.5; 10], 32), vec![5; 32]);
        assert!(compute_levels(&[0.5; 10], 0).is_empty());
    }

    #[test]
    fn test_non_finite_samples_do_not_panic() {
        let levels = compute_levels(&[f32::NAN; 64], 32);
        assert!(levels.iter().all(|&h| h == 5));
        let levels = compute_levels(&[f32::INFINITY; 64], 32);
        assert!(levels.iter().all(|&h| h == 55));
    }
}
