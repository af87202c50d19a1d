//! Text rendering of tuner output, one line per frame.

use swar_core::{ClarityTier, StabilizedOutput};

/// Bar glyphs from quiet to loud.
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Level heights run from 5 to 55.
const LEVEL_FLOOR: u8 = 5;
const LEVEL_SPAN: u8 = 50;

/// Formats a frame as `Dha  (Madhya, oct 4)  440.0 Hz  +0.4c  clear  ▁▂▃...`.
pub fn format_line(output: &StabilizedOutput) -> String {
    let degree = match (output.degree, output.saptak, output.octave) {
        (Some(degree), Some(saptak), Some(octave)) => {
            format!("{:<9} ({}, oct {})", degree.name(), saptak.name(), octave)
        }
        _ => format!("{:<9} {:>16}", "-", ""),
    };

    let pitch = match (output.has_pitch(), output.cents, output.clarity) {
        (true, Some(cents), Some(clarity)) => format!(
            "{:7.1} Hz {:+6.1}c  {}",
            output.frequency_hz,
            cents,
            clarity_label(clarity)
        ),
        _ => format!("{:>7} Hz {:>7}  {}", "-", "", "no pitch"),
    };

    format!("{}  {}  {}", degree, pitch, level_bars(&output.audio_levels))
}

fn clarity_label(clarity: ClarityTier) -> &'static str {
    match clarity {
        ClarityTier::Clear => "clear",
        ClarityTier::Approximate => "approximate",
        ClarityTier::Unclear => "unclear",
    }
}

fn level_bars(levels: &[u8]) -> String {
    levels
        .iter()
        .map(|&height| {
            let rise = height.saturating_sub(LEVEL_FLOOR).min(LEVEL_SPAN) as usize;
            BARS[rise * (BARS.len() - 1) / LEVEL_SPAN as usize]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swar_core::{Saptak, Swar};

    #[test]
    fn test_level_bars_span_the_range() {
        assert_eq!(level_bars(&[5, 55, 30]), "▁█▄");
    }

    #[test]
    fn test_format_pitched_line() {
        let output = StabilizedOutput {
            frequency_hz: 440.0,
            degree: Some(Swar::Dha),
            saptak: Some(Saptak::Middle),
            octave: Some(4),
            clarity: Some(ClarityTier::Clear),
            cents: Some(0.4),
            audio_levels: vec![5, 55],
        };
        let line = format_line(&output);
        assert!(line.starts_with("Dha"));
        assert!(line.contains("Madhya, oct 4"));
        assert!(line.contains("440.0 Hz"));
        assert!(line.contains("clear"));
        assert!(line.ends_with("▁█"));
    }

    #[test]
    fn test_format_silent_line() {
        let output = StabilizedOutput {
            frequency_hz: 0.0,
            degree: None,
            saptak: None,
            octave: None,
            clarity: None,
            cents: None,
            audio_levels: vec![5; 4],
        };
        let line = format_line(&output);
        assert!(line.starts_with('-'));
        assert!(line.contains("no pitch"));
    }
}
