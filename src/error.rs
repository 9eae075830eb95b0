//! Error types for trifield.
//!
//! Setup can fail while creating the window, the GPU device, or while
//! loading the sprite texture. The per-frame simulation itself has no
//! failure modes.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found (WebGPU/Vulkan/Metal/DX12 support is required)")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur while loading the sprite texture.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The image file could not be read or decoded.
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Raw RGBA data does not match the declared dimensions.
    #[error("RGBA data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    Empty { width: u32, height: u32 },
}

/// Invalid startup or filter configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("particle count must be at least 1")]
    NoParticles,
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("activation threshold must lie in (0, 1), got {0}")]
    Threshold(f32),
    #[error("bloom kernel size must be odd and between 5 and 15, got {0}")]
    KernelSize(u32),
    #[error("bloom quality must be between 1 and 8, got {0}")]
    Quality(u32),
}

/// Errors that can occur when running the field.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Sprite texture could not be loaded.
    #[error("texture error: {0}")]
    Texture(#[from] TextureError),
    /// Configuration was rejected before startup.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::NotPositive {
            field: "cell_size",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "cell_size must be positive, got 0");
        assert!(ConfigError::KernelSize(4).to_string().contains("got 4"));
    }

    #[test]
    fn test_simulation_error_wraps_config() {
        let err: SimulationError = ConfigError::NoParticles.into();
        assert!(matches!(err, SimulationError::Config(ConfigError::NoParticles)));
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
