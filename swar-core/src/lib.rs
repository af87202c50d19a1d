// swar-core/src/lib.rs

//! The core logic for the swar tuner.
//! This crate turns windows of raw audio samples into scale degrees of a
//! movable Hindustani scale, with a clarity grade and flicker suppression.
//! It is completely headless and contains no device or GUI code.
//!
//! ```
//! use swar_core::{Swar, TunerPipeline};
//!
//! let samples: Vec<f32> = (0..2048)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//!
//! let mut tuner = TunerPipeline::default();
//! tuner.start();
//! let output = tuner.push_frame(&samples, 44100);
//! assert_eq!(output.degree, Some(Swar::Dha));
//! ```

pub mod config;
pub mod error;
pub mod level;
pub mod pipeline;
pub mod pitch;
pub mod stabilizer;
pub mod swar;
pub mod tuning;

pub use config::TunerConfig;
pub use error::SwarError;
pub use pipeline::{StabilizedOutput, TunerPipeline};
pub use pitch::{AudioFrame, PitchEstimate, PitchEstimator};
pub use swar::{ClarityTier, Saptak, ScaleConfig, ScaleRoot, Swar, SwarMode, SwarResult};
pub use tuning::NoteEstimate;
