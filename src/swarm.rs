//! The particle array and its per-frame update.
//!
//! A [`Swarm`] owns all N particles for the lifetime of the field. Each
//! frame the host builds a [`Frame`] (elapsed time, screen size, pointer) and
//! calls [`Swarm::update`], which animates every particle and mirrors the
//! results into [`InstanceBuffers`] ready for upload.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{FieldConfig, Tuning};
use crate::particle::{Particle, Transition};

/// Screen rectangle in pixels, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// True when either side is zero (minimized window).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }

    /// Wrap a point into `[0, width) x [0, height)`.
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }

    /// Distance between two points divided by the screen diagonal, in `0.0..=1.0`.
    ///
    /// A degenerate screen reports the maximum distance.
    pub fn normalized_distance(&self, a: Vec2, b: Vec2) -> f32 {
        let diagonal = self.diagonal();
        if !(diagonal > f32::EPSILON) {
            return 1.0;
        }
        (a.distance(b) / diagonal).clamp(0.0, 1.0)
    }

    /// `1 - normalized_distance`: 1 on top of the point, 0 a diagonal away.
    pub fn proximity(&self, a: Vec2, b: Vec2) -> f32 {
        1.0 - self.normalized_distance(a, b)
    }
}

fn wrap_axis(value: f32, extent: f32) -> f32 {
    if !(extent > 0.0) || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Pointer position this frame and at the end of the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub position: Vec2,
    pub previous: Vec2,
}

impl Pointer {
    /// A pointer that has not moved.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            previous: position,
        }
    }

    /// Displacement since the previous frame, in pixels.
    pub fn velocity(&self) -> f32 {
        self.position.distance(self.previous)
    }

    pub fn moved(&self) -> bool {
        self.position != self.previous
    }

    /// Pointer moved further than `trigger` pixels this frame.
    pub fn is_fast(&self, trigger: f32) -> bool {
        self.moved() && self.velocity() > trigger
    }
}

/// Everything one update needs from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Elapsed time in seconds.
    pub time: f32,
    pub screen: Screen,
    pub pointer: Pointer,
}

/// CPU mirror of the two per-instance GPU buffers.
///
/// `positions` holds `x, y` pairs and `alphas` one value per particle, both
/// indexed by particle id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceBuffers {
    pub positions: Vec<f32>,
    pub alphas: Vec<f32>,
}

impl InstanceBuffers {
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![0.0; count * 2],
            alphas: vec![0.0; count],
        }
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.alphas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alphas.is_empty()
    }

    fn resize(&mut self, count: usize) {
        self.positions.resize(count * 2, 0.0);
        self.alphas.resize(count, 0.0);
    }

    fn write(&mut self, particle: &Particle) {
        let i = particle.id as usize;
        self.positions[i * 2] = particle.position.x;
        self.positions[i * 2 + 1] = particle.position.y;
        self.alphas[i] = particle.alpha;
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn alpha_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.alphas)
    }
}

/// Per-frame counters returned by [`Swarm::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Particles active after the update.
    pub active: u32,
    /// Inactive particles the pointer lit up.
    pub activated: u32,
    /// Particles that faded out.
    pub deactivated: u32,
    /// Particles lit by pointer velocity.
    pub forced: u32,
}

/// Fixed-size particle array plus the round-robin cursor for forced activation.
pub struct Swarm {
    particles: Vec<Particle>,
    config: FieldConfig,
    next_forced: usize,
    pixel_scale: f32,
    rng: StdRng,
}

impl Swarm {
    /// Allocate `config.particle_count` particles with origins scattered over `screen`.
    pub fn new(config: FieldConfig, screen: Screen) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let particles = (0..config.particle_count)
            .map(|id| Particle::new(id, random_point(&mut rng, screen)))
            .collect();

        log::debug!(
            "allocated {} particles over {}x{}",
            config.particle_count,
            screen.width,
            screen.height
        );

        Self {
            particles,
            config,
            next_forced: 0,
            pixel_scale: 1.0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Physical pixels per logical pixel.
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Set the window scale factor. Speed, push distance, velocity trigger
    /// and travel cap are logical and get multiplied by it each update.
    pub fn set_pixel_scale(&mut self, scale: f32) {
        self.pixel_scale = crate::config::pixel_scale(scale);
    }

    /// Index of the particle the next forced activation will light.
    pub fn next_forced(&self) -> usize {
        self.next_forced
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    /// Instance buffers sized for this swarm.
    pub fn instance_buffers(&self) -> InstanceBuffers {
        let mut buffers = InstanceBuffers::new(self.len());
        for particle in &self.particles {
            buffers.write(particle);
        }
        buffers
    }

    /// Scatter every origin over `screen` again. Ids and state are kept.
    pub fn scatter(&mut self, screen: Screen) {
        for particle in &mut self.particles {
            particle.origin = random_point(&mut self.rng, screen);
        }
        log::debug!("re-scattered {} origins", self.particles.len());
    }

    /// Light the next `n` particles in index order, wrapping at N.
    pub fn force_activate(&mut self, n: u32) -> u32 {
        if self.particles.is_empty() {
            return 0;
        }
        for _ in 0..n {
            self.particles[self.next_forced].make();
            self.next_forced = (self.next_forced + 1) % self.particles.len();
        }
        n
    }

    /// Advance every particle one frame and write the results into `out`.
    ///
    /// When the pointer moved faster than the configured trigger, `burst`
    /// particles are lit round-robin before the pass.
    pub fn update(&mut self, frame: &Frame, tuning: &Tuning, out: &mut InstanceBuffers) -> FrameStats {
        let mut stats = FrameStats::default();

        if out.len() != self.particles.len() {
            out.resize(self.particles.len());
        }

        let config = self.config.scaled(self.pixel_scale);
        let tuning = tuning.scaled(self.pixel_scale);

        if frame.pointer.is_fast(config.velocity_trigger) {
            stats.forced = self.force_activate(config.burst);
        }

        let count = self.particles.len() as u32;
        for particle in &mut self.particles {
            match particle.animate(count, frame, &tuning, &config) {
                Some(Transition::Activated) => stats.activated += 1,
                Some(Transition::Deactivated) => stats.deactivated += 1,
                None => {}
            }
            if particle.active {
                stats.active += 1;
            }
            out.write(particle);
        }

        stats
    }
}

fn random_point(rng: &mut StdRng, screen: Screen) -> Vec2 {
    let x = rng.gen::<f32>() * screen.width;
    let y = rng.gen::<f32>() * screen.height;
    screen.wrap(Vec2::new(x, y))
}
