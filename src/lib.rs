//! # trifield
//!
//! A cursor-reactive field of instanced sprites.
//!
//! Every particle drifts outward from a random origin along a heading taken
//! from its index, wraps around the screen edges, and lights up when the
//! pointer passes close by. Lit particles fade out as their age counter runs
//! up. Fast pointer movement lights particles round-robin. The field is drawn
//! as one instanced draw call and finished with a bloom and glow pass.
//!
//! ## Quick Start
//!
//! ```ignore
//! use trifield::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     init_logging(LoggingConfig::default());
//!     Simulation::new()
//!         .with_particle_count(5_000)
//!         .with_angle_mult(50.0)
//!         .with_max_travel_dist(100.0)
//!         .run()
//! }
//! ```
//!
//! ## Headless use
//!
//! The per-frame update has no GPU dependency. A [`Swarm`] can be stepped
//! directly and its [`InstanceBuffers`] inspected:
//!
//! ```
//! use trifield::{FieldConfig, Frame, InstanceBuffers, Pointer, Screen, Swarm, Tuning, Vec2};
//!
//! let screen = Screen::new(800.0, 600.0);
//! let config = FieldConfig { particle_count: 100, seed: Some(1), ..Default::default() };
//! let mut swarm = Swarm::new(config, screen);
//! let mut buffers = swarm.instance_buffers();
//!
//! let frame = Frame { time: 0.5, screen, pointer: Pointer::at(Vec2::new(400.0, 300.0)) };
//! let stats = swarm.update(&frame, &Tuning::default(), &mut buffers);
//! assert_eq!(buffers.len(), 100);
//! assert!(stats.active as usize <= swarm.len());
//! ```
//!
//! ## Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `Escape` | quit |
//! | `Space` | pause / resume the clock |
//! | `R` | scatter origins again |
//! | `F1` | toggle the debug panel (`egui` feature) |

pub mod config;
pub mod error;
mod gpu;
pub mod input;
pub mod logging;
#[cfg(feature = "egui")]
pub mod panel;
pub mod particle;
pub mod shader;
mod simulation;
pub mod swarm;
pub mod textures;
pub mod time;

pub use bytemuck;
pub use config::{BloomConfig, FieldConfig, Filters, GlowConfig, Tuning};
pub use error::{ConfigError, GpuError, SimulationError, TextureError};
pub use glam::{Vec2, Vec3, Vec4};
pub use logging::{init_logging, LoggingConfig};
pub use particle::{Particle, Transition};
pub use simulation::Simulation;
pub use swarm::{Frame, FrameStats, InstanceBuffers, Pointer, Screen, Swarm};
pub use textures::SpriteTexture;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use trifield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{BloomConfig, FieldConfig, Filters, GlowConfig, Tuning};
    pub use crate::error::SimulationError;
    pub use crate::logging::{init_logging, LoggingConfig};
    pub use crate::simulation::Simulation;
    pub use crate::swarm::{Frame, InstanceBuffers, Pointer, Screen, Swarm};
    pub use crate::textures::SpriteTexture;
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
    #[cfg(feature = "egui")]
    pub use egui;
}
