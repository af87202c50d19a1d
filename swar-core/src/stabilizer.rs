//! # Stabilizer Module
//!
//! Hold-and-reset hysteresis on the detected note, so that estimation jitter
//! around a note transition does not make the displayed degree flicker.
//!
//! The stabilizer works on note identity (chromatic index and octave). The
//! degree is derived from the held note afterwards, so a root change applies
//! to the held note immediately.

use std::time::{Duration, Instant};

use crate::tuning::NoteEstimate;

/// Default minimum time a newly accepted note is held.
pub const DEFAULT_MIN_HOLD: Duration = Duration::from_millis(100);

/// Default time after which any new note is accepted outright.
pub const DEFAULT_RESET_WINDOW: Duration = Duration::from_millis(300);

/// Note identity tracked across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeldNote {
    pub chromatic_index: u8,
    pub octave: i32,
}

impl From<&NoteEstimate> for HeldNote {
    fn from(note: &NoteEstimate) -> Self {
        Self {
            chromatic_index: note.chromatic_index,
            octave: note.octave,
        }
    }
}

/// What happened to a candidate note on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First note of the session, or the reset window had elapsed.
    Reset,
    /// The note changed after the hold window.
    Changed,
    /// Same note as held, nothing to do.
    Unchanged,
    /// A different note arrived inside the hold window and was suppressed.
    Suppressed,
}

#[derive(Debug, Clone, Copy)]
struct HoldState {
    note: HeldNote,
    last_change: Instant,
}

/// Debounces note changes.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    min_hold: Duration,
    reset_window: Duration,
    state: Option<HoldState>,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HOLD, DEFAULT_RESET_WINDOW)
    }
}

impl Stabilizer {
    pub fn new(min_hold: Duration, reset_window: Duration) -> Self {
        Self {
            min_hold,
            reset_window,
            state: None,
        }
    }

    /// Feeds the note detected on a valid tick and returns the note to show.
    ///
    /// - With nothing held, or once the reset window has passed since the last
    ///   change, the candidate is taken as-is and the timer restarts.
    /// - Inside the hold window the held note is returned unchanged.
    /// - After the hold window a different note replaces the held one and the
    ///   timer restarts; the same note leaves the timer alone.
    ///
    /// # Arguments
    /// * `candidate` - Note detected on this tick
    /// * `now` - Timestamp of this tick
    pub fn update(&mut self, candidate: HeldNote, now: Instant) -> HeldNote {
        self.decide(candidate, now).0
    }

    /// Like [`update`](Self::update), also reporting why.
    pub fn decide(&mut self, candidate: HeldNote, now: Instant) -> (HeldNote, Decision) {
        let state = match self.state.as_mut() {
            Some(state) => state,
            None => {
                log::debug!("Stabilizer: first note {:?}", candidate);
                self.state = Some(HoldState {
                    note: candidate,
                    last_change: now,
                });
                return (candidate, Decision::Reset);
            }
        };

        // A clock that goes backwards counts as no time elapsed.
        let elapsed = now.saturating_duration_since(state.last_change);

        if elapsed > self.reset_window {
            if state.note != candidate {
                log::debug!("Stabilizer: reset to {:?} after {:?}", candidate, elapsed);
            }
            state.note = candidate;
            state.last_change = now;
            return (candidate, Decision::Reset);
        }

        if elapsed < self.min_hold {
            let decision = if state.note == candidate {
                Decision::Unchanged
            } else {
                Decision::Suppressed
            };
            return (state.note, decision);
        }

        if state.note != candidate {
            log::debug!("Stabilizer: {:?} -> {:?}", state.note, candidate);
            state.note = candidate;
            state.last_change = now;
            return (candidate, Decision::Changed);
        }

        (state.note, Decision::Unchanged)
    }

    /// The currently held note, if any.
    pub fn held(&self) -> Option<HeldNote> {
        self.state.map(|s| s.note)
    }

    /// Forgets the held note.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn min_hold(&self) -> Duration {
        self.min_hold
    }
}
