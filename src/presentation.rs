//! Glue for a frame-driven front end.
//!
//! A renderer keeps one visual object per slot. [`FrameSync`] holds what the
//! renderer needs between frames, so no state lives in globals.

use std::ops::Range;

use crate::{body::Body, state::SimulationState};

/// Smallest radius a body is drawn with.
pub const MIN_DISPLAY_RADIUS: f64 = 0.02;

/// Radius a body of `mass` is drawn with.
#[must_use]
pub fn display_radius(mass: f64) -> f64 {
    (mass.log2() / 30.).max(MIN_DISPLAY_RADIUS)
}

/// The bodies of one frame.
#[derive(Debug)]
pub struct FrameUpdate<'a> {
    /// Slots that got their first body since the previous frame.
    pub new_slots: Range<usize>,
    /// Older slots whose body was replaced by one drawn with another radius.
    pub resized_slots: &'a [usize],
    /// The active bodies, indexed by slot.
    pub bodies: &'a [Body],
}

/// Per-renderer state carried from frame to frame.
#[derive(Debug, Default)]
pub struct FrameSync {
    bodies: Vec<Body>,
    radii: Vec<f64>,
    resized: Vec<usize>,
}

impl FrameSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots a visual object exists for.
    #[must_use]
    pub fn visuals(&self) -> usize {
        self.radii.len()
    }

    /// Take a snapshot of `state` for this frame.
    ///
    /// The number of bodies only ever grows, so every slot in `new_slots`
    /// needs a new visual object before the bodies are drawn. Slots in
    /// `resized_slots` need theirs rebuilt with [`display_radius`].
    pub fn refresh(&mut self, state: &SimulationState) -> FrameUpdate<'_> {
        state.snapshot_into(&mut self.bodies);

        let seen = self.radii.len();
        self.resized.clear();
        for (slot, body) in self.bodies.iter().enumerate() {
            let radius = display_radius(body.mass());
            match self.radii.get_mut(slot) {
                Some(old) if *old != radius => {
                    *old = radius;
                    self.resized.push(slot);
                }
                Some(_) => {}
                None => self.radii.push(radius),
            }
        }

        FrameUpdate {
            new_slots: seen..self.radii.len(),
            resized_slots: &self.resized,
            bodies: &self.bodies,
        }
    }
}
