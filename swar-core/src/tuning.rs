//! # Note Mapping Module
//!
//! Converts a detected frequency into its place on the 12-tone equal-tempered
//! chromatic scale: note index, octave and deviation in cents.
//!
//! ## Features
//! - Equal temperament with A4 = 440 Hz as the reference
//! - Chromatic index 0..11 with C = 0 and A = 9
//! - Octave numbering anchored so that 440 Hz sits in octave 4
//! - Cent deviation in the half-open range [-50, 50)
//! - Note name parsing with sharps and flats

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SwarError};

/// Reference pitch for the chromatic table (A4).
pub const REFERENCE_FREQUENCY: f32 = 440.0;

/// Chromatic index of the reference note (A).
pub const REFERENCE_INDEX: i32 = 9;

/// Octave of the reference note.
pub const REFERENCE_OCTAVE: i32 = 4;

/// The fixed chromatic table, sharp spelling.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings, used only when parsing.
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Static map for note name to chromatic index lookups.
///
/// Keys are lower-cased so that parsing is case-insensitive. Both sharp and
/// flat spellings are present, plus the enharmonic oddities a musician might
/// type (`E#`, `Fb`, `B#`, `Cb`).
static NOTE_MAP: Lazy<BTreeMap<String, u8>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    for (i, (sharp, flat)) in NOTE_NAMES.iter().zip(FLAT_NAMES.iter()).enumerate() {
        map.insert(sharp.to_lowercase(), i as u8);
        map.insert(flat.to_lowercase(), i as u8);
    }
    map.insert("e#".to_string(), 5);
    map.insert("fb".to_string(), 4);
    map.insert("b#".to_string(), 0);
    map.insert("cb".to_string(), 11);
    map
});

/// A frequency placed on the chromatic grid.
///
/// Only produced by [`NoteEstimate::from_frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEstimate {
    /// Chromatic index, 0 = C ... 9 = A ... 11 = B.
    pub chromatic_index: u8,
    /// Absolute octave (440 Hz is octave 4).
    pub octave: i32,
    /// Deviation from the nearest equal-tempered note, in [-50, 50).
    pub cents_deviation: f32,
}

impl NoteEstimate {
    /// Maps a frequency to the nearest equal-tempered note.
    ///
    /// Half-step values exactly halfway between two notes round upward, which
    /// keeps the cent deviation inside [-50, 50).
    ///
    /// # Arguments
    /// * `frequency` - Frequency in Hz
    ///
    /// # Returns
    /// * `Some(note)` - For any positive, finite frequency
    /// * `None` - For zero, negative or non-finite input
    pub fn from_frequency(frequency: f32) -> Option<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return None;
        }

        let exact = 12.0 * (frequency as f64 / REFERENCE_FREQUENCY as f64).log2();
        let rounded = (exact + 0.5).floor();
        let cents = ((exact - rounded) * 100.0) as f32;
        let rounded = rounded as i32;

        Some(Self {
            chromatic_index: (rounded + REFERENCE_INDEX).rem_euclid(12) as u8,
            octave: (rounded + REFERENCE_INDEX + 12 * REFERENCE_OCTAVE).div_euclid(12),
            cents_deviation: cents,
        })
    }

    /// Note name with octave, e.g. `"A4"` or `"C#5"`.
    pub fn name(&self) -> String {
        format!("{}{}", NOTE_NAMES[self.chromatic_index as usize], self.octave)
    }

    /// Semitones from A4 to this note.
    pub fn half_steps_from_reference(&self) -> i32 {
        (self.octave - REFERENCE_OCTAVE) * 12 + self.chromatic_index as i32 - REFERENCE_INDEX
    }

    /// The equal-tempered frequency of the note this estimate snapped to.
    pub fn reference_frequency(&self) -> f32 {
        REFERENCE_FREQUENCY * 2.0_f32.powf(self.half_steps_from_reference() as f32 / 12.0)
    }
}

/// Gets the chromatic index for a note name such as `"C"`, `"f#"` or `"Bb"`.
///
/// # Returns
/// * `Ok(index)` - Chromatic index 0..11
/// * `Err(SwarError::UnknownNoteName)` - If the name is not recognised
pub fn parse_chromatic_index(name: &str) -> Result<u8> {
    NOTE_MAP
        .get(&name.trim().to_lowercase())
        .copied()
        .ok_or_else(|| SwarError::UnknownNoteName(name.to_string()))
}

/// Name of a chromatic index, sharp spelling.
pub fn note_name(chromatic_index: u8) -> &'static str {
    NOTE_NAMES[(chromatic_index % 12) as usize]
}
