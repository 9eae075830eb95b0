//! Integration tests for the particle field update.
//!
//! These drive a seeded [`Swarm`] through many frames with a scripted pointer
//! and check the per-particle invariants after every frame.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trifield::{
    FieldConfig, Frame, InstanceBuffers, Particle, Pointer, Screen, Swarm, Tuning, Vec2,
};

const SCREEN: Screen = Screen {
    width: 800.0,
    height: 600.0,
};

fn swarm(count: u32, seed: u64) -> Swarm {
    let config = FieldConfig {
        particle_count: count,
        seed: Some(seed),
        ..Default::default()
    };
    Swarm::new(config, SCREEN)
}

/// Pointer that wanders slowly and now and then jumps far enough to count
/// as a fast movement.
struct PointerPath {
    rng: StdRng,
    position: Vec2,
}

impl PointerPath {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            position: Vec2::new(400.0, 300.0),
        }
    }

    fn next(&mut self) -> Pointer {
        let previous = self.position;
        let step = if self.rng.gen_bool(0.2) { 40.0 } else { 3.0 };
        let delta = Vec2::new(
            self.rng.gen_range(-step..step),
            self.rng.gen_range(-step..step),
        );
        self.position = SCREEN.wrap(self.position + delta);
        Pointer {
            position: self.position,
            previous,
        }
    }
}

/// Where `particle` sits before the pointer push, recomputed from its origin.
fn drift_position(particle: &Particle, count: u32, frame: &Frame, tuning: &Tuning, config: &FieldConfig) -> Vec2 {
    let angle = particle.id as f32 / count as f32 * tuning.angle_mult * TAU;
    let mut travel = frame.time * config.speed;
    if tuning.max_travel_dist > 0.0 {
        travel %= tuning.max_travel_dist;
    }
    frame
        .screen
        .wrap(particle.origin + Vec2::from_angle(angle) * travel)
}

// ============================================================================
// Per-frame invariants
// ============================================================================

#[test]
fn test_alpha_and_position_stay_in_bounds() {
    let mut swarm = swarm(2_000, 11);
    let mut buffers = swarm.instance_buffers();
    let mut path = PointerPath::new(3);
    let tuning = Tuning::default();

    for i in 0..600 {
        let frame = Frame {
            time: i as f32 / 60.0,
            screen: SCREEN,
            pointer: path.next(),
        };
        swarm.update(&frame, &tuning, &mut buffers);

        for p in swarm.particles() {
            assert!((0.0..=1.0).contains(&p.alpha), "alpha {} out of range", p.alpha);
            assert!(SCREEN.contains(p.position), "position {:?} off screen", p.position);
        }
    }
}

#[test]
fn test_activation_only_by_proximity_or_forced() {
    let mut swarm = swarm(1_500, 5);
    let mut buffers = swarm.instance_buffers();
    let mut path = PointerPath::new(9);
    let tuning = Tuning {
        angle_mult: 37.5,
        max_travel_dist: 150.0,
    };
    let config = swarm.config().clone();
    let count = swarm.len() as u32;

    for i in 0..400 {
        let frame = Frame {
            time: i as f32 / 60.0,
            screen: SCREEN,
            pointer: path.next(),
        };
        let before: Vec<bool> = swarm.particles().iter().map(|p| p.active).collect();
        let cursor = swarm.next_forced();

        let stats = swarm.update(&frame, &tuning, &mut buffers);

        let forced: Vec<usize> = (0..stats.forced as usize)
            .map(|k| (cursor + k) % swarm.len())
            .collect();

        for (idx, p) in swarm.particles().iter().enumerate() {
            if before[idx] || !p.active {
                continue;
            }
            let drift = drift_position(p, count, &frame, &tuning, &config);
            let proximity = SCREEN.proximity(drift, frame.pointer.position);
            assert!(
                forced.contains(&idx) || proximity > config.activation_threshold,
                "particle {idx} lit at proximity {proximity} without being forced"
            );
        }
    }
}

#[test]
fn test_active_particles_age_and_fade_out() {
    let mut swarm = swarm(300, 21);
    let mut buffers = swarm.instance_buffers();
    swarm.force_activate(300);
    assert_eq!(swarm.active_count(), 300);

    let tuning = Tuning::default();
    let pointer = Pointer::at(Vec2::new(10.0, 10.0));
    let mut faded = vec![false; swarm.len()];

    for i in 0..60 {
        let before: Vec<(bool, f32)> = swarm.particles().iter().map(|p| (p.active, p.clock)).collect();
        let frame = Frame {
            time: i as f32 / 60.0,
            screen: SCREEN,
            pointer,
        };
        swarm.update(&frame, &tuning, &mut buffers);

        for (idx, p) in swarm.particles().iter().enumerate() {
            let (was_active, clock) = before[idx];
            if was_active && p.active {
                assert!(p.clock > clock, "clock must keep rising while lit");
            }
            if was_active && !p.active {
                faded[idx] = true;
                assert_eq!(p.clock, 0.0);
            }
        }
    }

    assert!(faded.iter().all(|&f| f), "every lit particle fades within 60 frames");
}

#[test]
fn test_buffers_mirror_particles() {
    let mut swarm = swarm(500, 2);
    let mut buffers = InstanceBuffers::default();
    let mut path = PointerPath::new(77);

    for i in 0..50 {
        let frame = Frame {
            time: i as f32 * 0.02,
            screen: SCREEN,
            pointer: path.next(),
        };
        swarm.update(&frame, &Tuning::default(), &mut buffers);

        assert_eq!(buffers.len(), swarm.len());
        assert_eq!(buffers.positions.len(), swarm.len() * 2);
        for (idx, p) in swarm.particles().iter().enumerate() {
            assert_eq!(buffers.positions[idx * 2], p.position.x);
            assert_eq!(buffers.positions[idx * 2 + 1], p.position.y);
            assert_eq!(buffers.alphas[idx], p.alpha);
        }
    }
}

// ============================================================================
// Forced activation
// ============================================================================

#[test]
fn test_fast_pointer_forces_round_robin() {
    let config = FieldConfig {
        particle_count: 10,
        burst: 4,
        seed: Some(1),
        ..Default::default()
    };
    let mut swarm = Swarm::new(config, SCREEN);
    let mut buffers = swarm.instance_buffers();

    let fast = Pointer {
        position: Vec2::new(700.0, 500.0),
        previous: Vec2::new(600.0, 500.0),
    };
    for i in 0..3 {
        let frame = Frame {
            time: i as f32 / 60.0,
            screen: SCREEN,
            pointer: fast,
        };
        let stats = swarm.update(&frame, &Tuning::default(), &mut buffers);
        assert_eq!(stats.forced, 4);
    }
    assert_eq!(swarm.next_forced(), 2);
}

#[test]
fn test_slow_pointer_forces_nothing() {
    let mut swarm = swarm(50, 4);
    let mut buffers = swarm.instance_buffers();
    let slow = Pointer {
        position: Vec2::new(103.0, 100.0),
        previous: Vec2::new(100.0, 100.0),
    };
    let frame = Frame {
        time: 0.0,
        screen: SCREEN,
        pointer: slow,
    };
    let stats = swarm.update(&frame, &Tuning::default(), &mut buffers);
    assert_eq!(stats.forced, 0);
    assert_eq!(swarm.next_forced(), 0);
}

// ============================================================================
// Clock and screen edge cases
// ============================================================================

#[test]
fn test_frozen_clock_freezes_travel() {
    let mut swarm = swarm(200, 8);
    let mut buffers = swarm.instance_buffers();
    let frame = Frame {
        time: 1.25,
        screen: SCREEN,
        pointer: Pointer::at(Vec2::new(400.0, 300.0)),
    };

    swarm.update(&frame, &Tuning::default(), &mut buffers);
    let first = buffers.positions.clone();
    swarm.update(&frame, &Tuning::default(), &mut buffers);
    assert_eq!(first, buffers.positions);
}

#[test]
fn test_degenerate_screen_lights_nothing() {
    let mut swarm = swarm(100, 13);
    let mut buffers = swarm.instance_buffers();
    let frame = Frame {
        time: 2.0,
        screen: Screen::new(0.0, 0.0),
        pointer: Pointer::at(Vec2::ZERO),
    };
    let stats = swarm.update(&frame, &Tuning::default(), &mut buffers);

    assert_eq!(stats.activated, 0);
    assert_eq!(swarm.active_count(), 0);
    assert!(buffers.positions.iter().all(|&v| v == 0.0));
}

#[test]
fn test_same_seed_same_field() {
    let mut a = swarm(400, 99);
    let mut b = swarm(400, 99);
    let mut out_a = a.instance_buffers();
    let mut out_b = b.instance_buffers();
    let mut path_a = PointerPath::new(1);
    let mut path_b = PointerPath::new(1);

    for i in 0..30 {
        let time = i as f32 / 30.0;
        a.update(&Frame { time, screen: SCREEN, pointer: path_a.next() }, &Tuning::default(), &mut out_a);
        b.update(&Frame { time, screen: SCREEN, pointer: path_b.next() }, &Tuning::default(), &mut out_b);
    }
    assert_eq!(out_a, out_b);
}
