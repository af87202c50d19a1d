//! # Pipeline Controller Module
//!
//! Runs one tick of the tuner: level meter, pitch estimation, note mapping,
//! stabilization and swar translation, in that order. The controller owns the
//! only session state there is, the scale settings and the stabilizer.
//!
//! Frames are pushed in by the caller. Nothing here starts timers, touches
//! devices or blocks, so a tick is a plain synchronous function call.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::TunerConfig;
use crate::error::Result;
use crate::level;
use crate::pitch::{AudioFrame, PitchEstimator};
use crate::stabilizer::{HeldNote, Stabilizer};
use crate::swar::{self, ClarityTier, Saptak, ScaleConfig, ScaleRoot, Swar, SwarMode};
use crate::tuning::{self, NoteEstimate};

/// The externally visible result of one tick.
///
/// On a tick without pitch `frequency_hz` is 0.0, `clarity` and `cents` are
/// `None`, and `degree`/`saptak`/`octave` still show the held note (or `None`
/// before any note has been accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizedOutput {
    pub frequency_hz: f32,
    pub degree: Option<Swar>,
    pub saptak: Option<Saptak>,
    pub octave: Option<i32>,
    pub clarity: Option<ClarityTier>,
    /// Cent deviation of this tick's pitch from its nearest note.
    pub cents: Option<f32>,
    pub audio_levels: Vec<u8>,
}

impl StabilizedOutput {
    /// Whether this tick carried a pitch.
    pub fn has_pitch(&self) -> bool {
        self.frequency_hz > 0.0
    }
}

/// Per-session tuner pipeline.
#[derive(Debug, Clone)]
pub struct TunerPipeline {
    estimator: PitchEstimator,
    stabilizer: Stabilizer,
    scale: ScaleConfig,
    bar_count: usize,
}

impl Default for TunerPipeline {
    fn default() -> Self {
        Self::from_parts(&TunerConfig::default())
    }
}

impl TunerPipeline {
    /// Builds a pipeline from a validated configuration.
    ///
    /// # Returns
    /// * `Err(SwarError::InvalidConfig)` - If the parameters are inconsistent
    pub fn new(config: &TunerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: &TunerConfig) -> Self {
        Self {
            estimator: PitchEstimator::new(
                config.min_frequency,
                config.max_frequency,
                config.silence_threshold,
                config.yin_threshold,
            ),
            stabilizer: Stabilizer::new(config.min_hold(), config.reset_window()),
            scale: ScaleConfig {
                root: config.scale_root,
                mode: config.swar_mode,
            },
            bar_count: config.bar_count,
        }
    }

    /// Begins a session: forgets any held note.
    pub fn start(&mut self) {
        log::info!(
            "Session started (Sa = {}, {:?} mode)",
            self.scale.root.name(),
            self.scale.mode
        );
        self.stabilizer.reset();
    }

    /// Ends a session. Nothing is released; the caller simply stops pushing.
    pub fn stop(&mut self) {
        log::info!("Session stopped");
    }

    /// Sets Sa to a chromatic index, effective from the next frame.
    ///
    /// # Returns
    /// * `Err(SwarError::InvalidScaleRoot)` - If `chromatic_index` is outside 0..=11
    pub fn set_scale_root(&mut self, chromatic_index: i32) -> Result<()> {
        let root = ScaleRoot::new(chromatic_index)?;
        self.set_root(root);
        Ok(())
    }

    /// Sets Sa from an already validated root.
    pub fn set_root(&mut self, root: ScaleRoot) {
        if root != self.scale.root {
            log::debug!("Scale root changed: {} -> {}", self.scale.root.name(), root.name());
        }
        self.scale.root = root;
    }

    pub fn set_swar_mode(&mut self, mode: SwarMode) {
        if mode != self.scale.mode {
            log::info!("Swar mode changed to {:?}", mode);
        }
        self.scale.mode = mode;
    }

    pub fn scale(&self) -> ScaleConfig {
        self.scale
    }

    /// Processes one frame, timestamped now.
    pub fn push_frame(&mut self, samples: &[f32], sample_rate: u32) -> StabilizedOutput {
        self.push_frame_at(samples, sample_rate, Instant::now())
    }

    /// Processes one frame with an explicit timestamp.
    ///
    /// Always returns exactly one output; no input makes this panic.
    pub fn push_frame_at(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
        now: Instant,
    ) -> StabilizedOutput {
        let frame = AudioFrame::new(samples, sample_rate);
        let audio_levels = level::compute_levels(frame.samples, self.bar_count);

        let estimate = self.estimator.estimate(&frame);
        let note = estimate.frequency().and_then(NoteEstimate::from_frequency);

        let Some(note) = note else {
            return self.no_pitch(audio_levels);
        };

        log::trace!(
            "{:.2} Hz -> {} ({:+.1} cents, d' {:.3})",
            estimate.frequency_hz,
            note.name(),
            note.cents_deviation,
            estimate.aperiodicity
        );

        // Frequency and clarity follow this tick; degree and octave follow
        // the stabilized note.
        let shown = self.stabilizer.update(HeldNote::from(&note), now);
        let result = swar::translate_parts(
            shown.chromatic_index,
            shown.octave,
            note.cents_deviation,
            &self.scale,
        );

        StabilizedOutput {
            frequency_hz: estimate.frequency_hz,
            degree: Some(result.degree),
            saptak: Some(result.saptak),
            octave: Some(shown.octave),
            clarity: Some(result.clarity),
            cents: Some(note.cents_deviation),
            audio_levels,
        }
    }

    /// Output for a tick without pitch; the held note is left alone.
    fn no_pitch(&self, audio_levels: Vec<u8>) -> StabilizedOutput {
        let held = self.stabilizer.held();
        StabilizedOutput {
            frequency_hz: 0.0,
            degree: held.map(|held| swar::degree_for(held.chromatic_index, &self.scale)),
            saptak: held.map(|held| Saptak::from_octave(held.octave)),
            octave: held.map(|held| held.octave),
            clarity: None,
            cents: None,
            audio_levels,
        }
    }

    /// Name of the held note, e.g. `"A4"`.
    pub fn held_note_name(&self) -> Option<String> {
        self.stabilizer
            .held()
            .map(|held| format!("{}{}", tuning::note_name(held.chromatic_index), held.octave))
    }
}
