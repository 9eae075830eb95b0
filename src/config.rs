//! Configuration for the particle field and its post-process filters.
//!
//! [`FieldConfig`] holds values fixed at startup (particle count, sprite
//! size, motion constants). [`Tuning`] holds the two parameters that stay
//! editable while the field runs. [`Filters`] describes the bloom and glow
//! passes applied to the rendered scene.

use glam::{Vec3, Vec4};

use crate::error::ConfigError;

/// Default background colour (deep navy).
pub const DEFAULT_BACKGROUND: u32 = 0x071134;
/// Default glow colour (cyan).
pub const DEFAULT_GLOW_COLOR: u32 = 0x64f0f5;

/// Startup configuration for the particle field.
///
/// Everything here is fixed once the window opens. Use [`Tuning`] for the
/// values exposed on the debug panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Number of particles (N). Fixed for the lifetime of the field.
    pub particle_count: u32,
    /// Edge length of one sprite quad in logical pixels.
    pub cell_size: f32,
    /// Radial travel speed from the origin, in pixels per second.
    pub speed: f32,
    /// Proximity above which an inactive particle activates.
    pub activation_threshold: f32,
    /// Displacement along the pointer direction, scaled by proximity.
    /// Negative values push particles away from the cursor.
    pub push_distance: f32,
    /// Clock increment per frame while a particle is active.
    pub age_step: f32,
    /// Pointer displacement per frame (pixels) that triggers forced activation.
    pub velocity_trigger: f32,
    /// Particles force-activated per frame while the pointer moves fast.
    pub burst: u32,
    /// Seed for the origin scatter. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 5_000,
            cell_size: 5.0,
            speed: 150.0,
            activation_threshold: 0.95,
            push_distance: -20.0,
            age_step: 0.0025,
            velocity_trigger: 5.0,
            burst: 1,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Check that the configuration can drive a field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        for (field, value) in [
            ("cell_size", self.cell_size),
            ("speed", self.speed),
            ("age_step", self.age_step),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.activation_threshold > 0.0 && self.activation_threshold < 1.0) {
            return Err(ConfigError::Threshold(self.activation_threshold));
        }
        Ok(())
    }

    /// Copy with the pixel distances (`speed`, `push_distance`,
    /// `velocity_trigger`) converted from logical to physical pixels.
    ///
    /// `cell_size` stays logical; the sprite pass scales it on upload.
    pub fn scaled(&self, scale: f32) -> Self {
        let scale = pixel_scale(scale);
        Self {
            speed: self.speed * scale,
            push_distance: self.push_distance * scale,
            velocity_trigger: self.velocity_trigger * scale,
            ..self.clone()
        }
    }
}

/// Window scale factor, falling back to 1 for anything unusable.
pub(crate) fn pixel_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Live parameters edited from the debug panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// How many full turns the angle sweeps across the particle index range.
    pub angle_mult: f32,
    /// Travel distance after which a particle restarts from its origin.
    /// Zero disables the cap.
    pub max_travel_dist: f32,
}

impl Tuning {
    /// Range offered by the angle multiplier slider.
    pub const ANGLE_MULT_RANGE: std::ops::RangeInclusive<f32> = 0.0..=200.0;
    /// Range offered by the travel distance slider.
    pub const MAX_TRAVEL_RANGE: std::ops::RangeInclusive<f32> = 0.0..=200.0;

    /// Clamp both parameters into their slider ranges.
    pub fn clamped(self) -> Self {
        Self {
            angle_mult: self
                .angle_mult
                .clamp(*Self::ANGLE_MULT_RANGE.start(), *Self::ANGLE_MULT_RANGE.end()),
            max_travel_dist: self
                .max_travel_dist
                .clamp(*Self::MAX_TRAVEL_RANGE.start(), *Self::MAX_TRAVEL_RANGE.end()),
        }
    }

    /// Copy with the travel cap converted from logical to physical pixels.
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            max_travel_dist: self.max_travel_dist * pixel_scale(scale),
            ..self
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            angle_mult: 50.0,
            max_travel_dist: 100.0,
        }
    }
}

/// Bloom: blurred copy of the scene added back on top of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Blur spread in pixels.
    pub strength: f32,
    /// Number of horizontal + vertical blur passes.
    pub quality: u32,
    /// Gaussian tap count per pass (odd, 5..=15).
    pub kernel_size: u32,
    /// Multiplier applied to the blurred scene in the composite.
    pub intensity: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 10.0,
            quality: 5,
            kernel_size: 7,
            intensity: 1.0,
        }
    }
}

impl BloomConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kernel_size % 2 == 0 || !(5..=15).contains(&self.kernel_size) {
            return Err(ConfigError::KernelSize(self.kernel_size));
        }
        if !(1..=8).contains(&self.quality) {
            return Err(ConfigError::Quality(self.quality));
        }
        Ok(())
    }

    /// Pixel step between blur taps for a single pass.
    ///
    /// The total spread is shared across passes and the half-kernel.
    pub fn tap_spacing(&self) -> f32 {
        let radius = (self.kernel_size / 2).max(1) as f32;
        (self.strength / (self.quality.max(1) as f32 * radius)).max(0.0)
    }
}

/// Outer/inner glow around everything drawn in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowConfig {
    pub enabled: bool,
    /// Glow colour as `0xRRGGBB`.
    pub color: u32,
    /// Sampling distance in pixels.
    pub distance: f32,
    pub inner_strength: f32,
    pub outer_strength: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: DEFAULT_GLOW_COLOR,
            distance: 1.0,
            inner_strength: 0.0,
            outer_strength: 2.0,
        }
    }
}

/// Post-process filter chain plus the background it composites over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filters {
    pub bloom: BloomConfig,
    pub glow: GlowConfig,
    /// Background colour as `0xRRGGBB`.
    pub background: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            bloom: BloomConfig::default(),
            glow: GlowConfig::default(),
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl Filters {
    /// Filters with both bloom and glow switched off.
    pub fn none() -> Self {
        let mut filters = Self::default();
        filters.bloom.enabled = false;
        filters.glow.enabled = false;
        filters
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bloom.validate()
    }
}

/// Split `0xRRGGBB` into RGB components in `0.0..=1.0` (sRGB encoded).
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// Convert one sRGB-encoded channel to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Colour for a render target: linearised when the target is sRGB, since
/// the hardware re-encodes on write.
pub fn target_color(hex: u32, srgb_target: bool) -> Vec4 {
    let rgb = hex_to_rgb(hex);
    let rgb = if srgb_target {
        Vec3::new(srgb_to_linear(rgb.x), srgb_to_linear(rgb.y), srgb_to_linear(rgb.z))
    } else {
        rgb
    };
    rgb.extend(1.0)
}
