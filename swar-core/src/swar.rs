//! # Swar Translation Module
//!
//! Maps a chromatic note onto the degrees of a movable Hindustani scale whose
//! tonic (Sa) is the configured root, and grades how cleanly the note was
//! played.
//!
//! ## Features
//! - Exact 12-degree table (7 natural + 5 komal/tivra)
//! - Legacy nearest-natural mode collapsing onto the 7 shuddh degrees
//! - Saptak (register) from the absolute octave
//! - Clarity tiers from the cent deviation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SwarError};
use crate::tuning::{self, NoteEstimate};

/// Upper bound (exclusive) on |cents| for a clear note.
pub const CLEAR_CENTS: f32 = 25.0;

/// Upper bound (exclusive) on |cents| for an approximate note.
pub const APPROXIMATE_CENTS: f32 = 45.0;

/// One of the twelve scale degrees.
///
/// The discriminant is the semitone offset from Sa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Swar {
    Sa = 0,
    KomalRe = 1,
    Re = 2,
    KomalGa = 3,
    Ga = 4,
    Ma = 5,
    TivraMa = 6,
    Pa = 7,
    KomalDha = 8,
    Dha = 9,
    KomalNi = 10,
    Ni = 11,
}

impl Swar {
    /// All degrees in ascending order from Sa.
    pub const ALL: [Swar; 12] = [
        Swar::Sa,
        Swar::KomalRe,
        Swar::Re,
        Swar::KomalGa,
        Swar::Ga,
        Swar::Ma,
        Swar::TivraMa,
        Swar::Pa,
        Swar::KomalDha,
        Swar::Dha,
        Swar::KomalNi,
        Swar::Ni,
    ];

    /// The seven shuddh (natural) degrees.
    pub const NATURAL: [Swar; 7] = [
        Swar::Sa,
        Swar::Re,
        Swar::Ga,
        Swar::Ma,
        Swar::Pa,
        Swar::Dha,
        Swar::Ni,
    ];

    /// Degree at a semitone offset from Sa. Offsets wrap modulo 12.
    pub fn from_offset(offset: u8) -> Swar {
        Swar::ALL[(offset % 12) as usize]
    }

    /// Semitones above Sa.
    pub fn offset(self) -> u8 {
        self as u8
    }

    pub fn is_natural(self) -> bool {
        Swar::NATURAL.contains(&self)
    }

    /// Display name, e.g. `"Komal-Re"`.
    pub fn name(self) -> &'static str {
        match self {
            Swar::Sa => "Sa",
            Swar::KomalRe => "Komal-Re",
            Swar::Re => "Re",
            Swar::KomalGa => "Komal-Ga",
            Swar::Ga => "Ga",
            Swar::Ma => "Ma",
            Swar::TivraMa => "Tivra-Ma",
            Swar::Pa => "Pa",
            Swar::KomalDha => "Komal-Dha",
            Swar::Dha => "Dha",
            Swar::KomalNi => "Komal-Ni",
            Swar::Ni => "Ni",
        }
    }

    /// Sargam shorthand: lower case for komal, `Ma'` for tivra.
    pub fn short_name(self) -> &'static str {
        match self {
            Swar::Sa => "Sa",
            Swar::KomalRe => "re",
            Swar::Re => "Re",
            Swar::KomalGa => "ga",
            Swar::Ga => "Ga",
            Swar::Ma => "Ma",
            Swar::TivraMa => "Ma'",
            Swar::Pa => "Pa",
            Swar::KomalDha => "dha",
            Swar::Dha => "Dha",
            Swar::KomalNi => "ni",
            Swar::Ni => "Ni",
        }
    }
}

impl fmt::Display for Swar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Octave register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Saptak {
    /// Mandra saptak, octave 3 and below.
    Lower,
    /// Madhya saptak, octave 4.
    Middle,
    /// Taar saptak, octave 5 and above.
    Upper,
}

impl Saptak {
    /// Register of an absolute octave number.
    pub fn from_octave(octave: i32) -> Saptak {
        match octave {
            i32::MIN..=3 => Saptak::Lower,
            4 => Saptak::Middle,
            _ => Saptak::Upper,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Saptak::Lower => "Mandra",
            Saptak::Middle => "Madhya",
            Saptak::Upper => "Taar",
        }
    }
}

/// How close the played pitch is to the equal-tempered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarityTier {
    Clear,
    Approximate,
    Unclear,
}

impl ClarityTier {
    /// Grades a cent deviation: under 25 is clear, under 45 approximate.
    pub fn from_cents(cents: f32) -> ClarityTier {
        let cents = cents.abs();
        if cents < CLEAR_CENTS {
            ClarityTier::Clear
        } else if cents < APPROXIMATE_CENTS {
            ClarityTier::Approximate
        } else {
            ClarityTier::Unclear
        }
    }
}

/// How chromatic offsets are turned into degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwarMode {
    /// Every offset has its own degree, komal and tivra included.
    #[default]
    Chromatic,
    /// Offsets collapse onto the nearest of the seven natural degrees; an
    /// offset equidistant from two naturals goes to the lower one.
    Natural,
}

/// The tonic of the scale as a chromatic index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ScaleRoot(u8);

impl ScaleRoot {
    /// Checked constructor.
    ///
    /// # Returns
    /// * `Err(SwarError::InvalidScaleRoot)` - If `index` is outside 0..=11
    pub fn new(index: i32) -> Result<Self> {
        if (0..12).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(SwarError::InvalidScaleRoot(index))
        }
    }

    /// Root from a note name such as `"C#"` or `"Bb"`.
    pub fn from_name(name: &str) -> Result<Self> {
        tuning::parse_chromatic_index(name).map(Self)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        tuning::note_name(self.0)
    }
}

impl TryFrom<i32> for ScaleRoot {
    type Error = SwarError;

    fn try_from(index: i32) -> Result<Self> {
        Self::new(index)
    }
}

impl From<ScaleRoot> for i32 {
    fn from(root: ScaleRoot) -> i32 {
        root.0 as i32
    }
}

impl std::str::FromStr for ScaleRoot {
    type Err = SwarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Session scale settings, read by the translator every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub root: ScaleRoot,
    pub mode: SwarMode,
}

/// A note placed in the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarResult {
    pub degree: Swar,
    pub saptak: Saptak,
    pub clarity: ClarityTier,
}

/// Semitone offset of a chromatic index above the root, in 0..11.
pub fn relative_offset(chromatic_index: u8, root: ScaleRoot) -> u8 {
    (chromatic_index as i32 - root.index() as i32).rem_euclid(12) as u8
}

/// Degree for a chromatic index under the given scale.
pub fn degree_for(chromatic_index: u8, scale: &ScaleConfig) -> Swar {
    let offset = relative_offset(chromatic_index, scale.root);
    match scale.mode {
        SwarMode::Chromatic => Swar::from_offset(offset),
        SwarMode::Natural => nearest_natural(offset),
    }
}

fn nearest_natural(offset: u8) -> Swar {
    // min_by_key keeps the first of equal distances, i.e. the lower degree.
    Swar::NATURAL
        .iter()
        .copied()
        .min_by_key(|natural| {
            let d = (natural.offset() as i32 - offset as i32).abs();
            d.min(12 - d)
        })
        .unwrap_or(Swar::Sa)
}

/// Translates a note into a degree, register and clarity tier.
///
/// The register uses the absolute octave of the note, not its position
/// relative to the root.
pub fn translate(note: &NoteEstimate, scale: &ScaleConfig) -> SwarResult {
    translate_parts(note.chromatic_index, note.octave, note.cents_deviation, scale)
}

/// [`translate`] for a note given by its parts, e.g. a held note shown with
/// the current tick's deviation.
pub fn translate_parts(
    chromatic_index: u8,
    octave: i32,
    cents_deviation: f32,
    scale: &ScaleConfig,
) -> SwarResult {
    SwarResult {
        degree: degree_for(chromatic_index, scale),
        saptak: Saptak::from_octave(octave),
        clarity: ClarityTier::from_cents(cents_deviation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(root: i32) -> ScaleConfig {
        ScaleConfig {
            root: ScaleRoot::new(root).unwrap(),
            mode: SwarMode::Chromatic,
        }
    }

    #[test]
    fn test_table_with_root_c() {
        let expected = [
            "Sa", "Komal-Re", "Re", "Komal-Ga", "Ga", "Ma", "Tivra-Ma", "Pa", "Komal-Dha", "Dha",
            "Komal-Ni", "Ni",
        ];
        let scale = scale(0);
        for (index, name) in expected.iter().enumerate() {
            assert_eq!(degree_for(index as u8, &scale).name(), *name);
        }
        assert_eq!(degree_for(2, &scale), Swar::Re);
        assert_eq!(degree_for(6, &scale), Swar::TivraMa);
    }

    #[test]
    fn test_root_change_rotates_degrees() {
        for root in 0..12 {
            let scale = scale(root);
            assert_eq!(degree_for(root as u8, &scale), Swar::Sa);
            for index in 0..12_u8 {
                let expected = Swar::from_offset((index as i32 - root).rem_euclid(12) as u8);
                assert_eq!(degree_for(index, &scale), expected);
            }
        }

        // D as Sa: A is Pa, C is Komal-Ni.
        let d = scale(2);
        assert_eq!(degree_for(9, &d), Swar::Pa);
        assert_eq!(degree_for(0, &d), Swar::KomalNi);
    }

    #[test]
    fn test_natural_mode_collapses_to_seven() {
        let scale = ScaleConfig {
            root: ScaleRoot::default(),
            mode: SwarMode::Natural,
        };
        let degrees: Vec<Swar> = (0..12).map(|i| degree_for(i, &scale)).collect();
        assert_eq!(
            degrees,
            vec![
                Swar::Sa,
                Swar::Sa,
                Swar::Re,
                Swar::Re,
                Swar::Ga,
                Swar::Ma,
                Swar::Ma,
                Swar::Pa,
                Swar::Pa,
                Swar::Dha,
                Swar::Dha,
                Swar::Ni,
            ]
        );
        assert!(degrees.iter().all(|d| d.is_natural()));
    }

    #[test]
    fn test_saptak_from_absolute_octave() {
        assert_eq!(Saptak::from_octave(2), Saptak::Lower);
        assert_eq!(Saptak::from_octave(3), Saptak::Lower);
        assert_eq!(Saptak::from_octave(4), Saptak::Middle);
        assert_eq!(Saptak::from_octave(5), Saptak::Upper);
        assert_eq!(Saptak::from_octave(7), Saptak::Upper);
    }

    #[test]
    fn test_clarity_tiers() {
        assert_eq!(ClarityTier::from_cents(0.0), ClarityTier::Clear);
        assert_eq!(ClarityTier::from_cents(-24.9), ClarityTier::Clear);
        assert_eq!(ClarityTier::from_cents(25.0), ClarityTier::Approximate);
        assert_eq!(ClarityTier::from_cents(-44.9), ClarityTier::Approximate);
        assert_eq!(ClarityTier::from_cents(45.0), ClarityTier::Unclear);
        assert_eq!(ClarityTier::from_cents(-50.0), ClarityTier::Unclear);
    }

    #[test]
    fn test_translate_uses_absolute_octave() {
        // G3 with root A: degree below Sa, but the register follows octave 3.
        let note = NoteEstimate::from_frequency(196.0).unwrap();
        let result = translate(&note, &scale(9));
        assert_eq!(result.degree, Swar::KomalNi);
        assert_eq!(result.saptak, Saptak::Lower);
        assert_eq!(result.clarity, ClarityTier::Clear);
    }

    #[test]
    fn test_scale_root_is_checked() {
        assert!(ScaleRoot::new(0).is_ok());
        assert!(ScaleRoot::new(11).is_ok());
        assert_eq!(ScaleRoot::new(12), Err(SwarError::InvalidScaleRoot(12)));
        assert_eq!(ScaleRoot::new(-1), Err(SwarError::InvalidScaleRoot(-1)));
        assert_eq!("F#".parse::<ScaleRoot>().unwrap().index(), 6);
        assert_eq!(ScaleRoot::new(10).unwrap().name(), "A#");
    }

    #[test]
    fn test_short_names() {
        assert_eq!(Swar::KomalGa.short_name(), "ga");
        assert_eq!(Swar::TivraMa.short_name(), "Ma'");
        assert_eq!(Swar::Dha.to_string(), "Dha");
    }
}
