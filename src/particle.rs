//! A single sprite in the field.
//!
//! Each particle orbits away from a fixed origin along a heading derived from
//! its index, is nudged by the pointer, and lights up when the pointer comes
//! close. Once lit it ages on its own clock until its alpha fades to zero.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::config::{FieldConfig, Tuning};
use crate::swarm::Frame;

/// Change of the `active` flag produced by one call to [`Particle::animate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activated,
    Deactivated,
}

/// One instanced sprite.
///
/// `id` is the particle's slot in the instance buffers and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u32,
    /// Position written to the instance buffer, in screen pixels.
    pub position: Vec2,
    /// Anchor the particle travels away from.
    pub origin: Vec2,
    /// Age counter, advanced only while active.
    pub clock: f32,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
    pub active: bool,
}

impl Particle {
    /// Create an inactive, invisible particle resting at `origin`.
    pub fn new(id: u32, origin: Vec2) -> Self {
        Self {
            id,
            position: origin,
            origin,
            clock: 0.0,
            alpha: 0.0,
            active: false,
        }
    }

    /// Light the particle up at full opacity.
    ///
    /// The clock is left alone; only deactivation resets it.
    pub fn make(&mut self) {
        self.active = true;
        self.alpha = 1.0;
    }

    /// Return to the inactive state and restart the clock.
    pub fn destroy(&mut self) {
        self.active = false;
        self.clock = 0.0;
    }

    /// Advance one frame.
    ///
    /// `count` is the total particle count, used to spread headings over a
    /// full turn (times `tuning.angle_mult`).
    pub fn animate(
        &mut self,
        count: u32,
        frame: &Frame,
        tuning: &Tuning,
        config: &FieldConfig,
    ) -> Option<Transition> {
        let screen = frame.screen;

        let fraction = self.id as f32 / count.max(1) as f32;
        let angle = fraction * tuning.angle_mult * TAU;

        let mut travel = frame.time * config.speed;
        if tuning.max_travel_dist > 0.0 {
            travel %= tuning.max_travel_dist;
        }

        let position = screen.wrap(self.origin + Vec2::from_angle(angle) * travel);

        // Activation uses the distance before the pointer push.
        let proximity = screen.proximity(position, frame.pointer.position);

        let toward_pointer = (frame.pointer.position - position).normalize_or_zero();
        self.position = screen.wrap(position + toward_pointer * config.push_distance * proximity);

        let mut transition = None;

        if proximity > config.activation_threshold && !self.active {
            self.make();
            log::trace!("particle {} activated (proximity {:.3})", self.id, proximity);
            transition = Some(Transition::Activated);
        }

        if self.active {
            self.clock += config.age_step;
        }

        self.alpha = (self.alpha - self.clock).clamp(0.0, 1.0);

        if self.active && self.alpha <= 0.0 {
            self.destroy();
            log::trace!("particle {} faded out", self.id);
            transition = Some(Transition::Deactivated);
        }

        transition
    }
}
