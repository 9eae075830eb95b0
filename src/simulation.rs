//! Simulation builder and runner

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::KeyCode,
    window::{Window, WindowId},
};

use crate::config::{BloomConfig, FieldConfig, Filters, GlowConfig, Tuning};
use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::input::Input;
use crate::shader::SpriteUniforms;
use crate::swarm::{Frame, FrameStats, InstanceBuffers, Screen, Swarm};
use crate::textures::SpriteTexture;
use crate::time::Time;

#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;
#[cfg(feature = "egui")]
use crate::panel::{DebugPanel, PanelStatus};

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
enum SpriteSource {
    Procedural,
    Texture(SpriteTexture),
    File(PathBuf),
}

/// A particle field builder.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// ```ignore
/// Simulation::new()
///     .with_particle_count(8_000)
///     .with_angle_mult(42.0)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: FieldConfig,
    tuning: Tuning,
    filters: Filters,
    sprite: SpriteSource,
    title: String,
}

impl Simulation {
    /// Create a new simulation with default settings.
    pub fn new() -> Self {
        Self {
            config: FieldConfig::default(),
            tuning: Tuning::default(),
            filters: Filters::default(),
            sprite: SpriteSource::Procedural,
            title: "trifield".to_string(),
        }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Sprite edge length in logical pixels.
    pub fn with_cell_size(mut self, size: f32) -> Self {
        self.config.cell_size = size;
        self
    }

    /// Seed origin scattering for a reproducible layout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replace the whole field configuration.
    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial angle multiplier, clamped to the panel range.
    pub fn with_angle_mult(mut self, angle_mult: f32) -> Self {
        self.tuning.angle_mult = angle_mult;
        self.tuning = self.tuning.clamped();
        self
    }

    /// Initial travel cap, clamped to the panel range. Zero disables it.
    pub fn with_max_travel_dist(mut self, dist: f32) -> Self {
        self.tuning.max_travel_dist = dist;
        self.tuning = self.tuning.clamped();
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning.clamped();
        self
    }

    /// Use an already decoded sprite.
    pub fn with_sprite(mut self, sprite: SpriteTexture) -> Self {
        self.sprite = SpriteSource::Texture(sprite);
        self
    }

    /// Load the sprite from an image file when the simulation starts.
    pub fn with_sprite_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sprite = SpriteSource::File(path.into());
        self
    }

    pub fn with_bloom(mut self, bloom: BloomConfig) -> Self {
        self.filters.bloom = bloom;
        self
    }

    pub fn with_glow(mut self, glow: GlowConfig) -> Self {
        self.filters.glow = glow;
        self
    }

    /// Background colour as `0xRRGGBB`.
    pub fn with_background(mut self, color: u32) -> Self {
        self.filters.background = color;
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Disable bloom and glow.
    pub fn without_filters(mut self) -> Self {
        self.filters = Filters {
            background: self.filters.background,
            ..Filters::none()
        };
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Run the simulation. This blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;
        self.filters.validate()?;

        let sprite = match self.sprite {
            SpriteSource::Procedural => SpriteTexture::default(),
            SpriteSource::Texture(sprite) => sprite,
            SpriteSource::File(path) => SpriteTexture::from_file(path)?,
        };

        log::info!(
            "starting field: {} particles, angle mult {}, max travel {}",
            self.config.particle_count,
            self.tuning.angle_mult,
            self.tuning.max_travel_dist
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, self.tuning, self.filters, sprite, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: FieldConfig,
    tuning: Tuning,
    filters: Filters,
    sprite: SpriteTexture,
    title: String,

    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    swarm: Option<Swarm>,
    instances: InstanceBuffers,
    input: Input,
    time: Time,
    stats: FrameStats,
    /// Setup failure raised inside a winit callback, returned from `run`.
    error: Option<SimulationError>,

    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    panel: DebugPanel,
}

impl App {
    fn new(
        config: FieldConfig,
        tuning: Tuning,
        filters: Filters,
        sprite: SpriteTexture,
        title: String,
    ) -> Self {
        Self {
            config,
            tuning,
            filters,
            sprite,
            title,
            window: None,
            gpu_state: None,
            swarm: None,
            instances: InstanceBuffers::default(),
            input: Input::new(),
            time: Time::new(),
            stats: FrameStats::default(),
            error: None,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            panel: DebugPanel::default(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();

        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            &self.sprite,
            self.config.particle_count,
        ))?;

        let mut swarm = Swarm::new(
            self.config.clone(),
            Screen::new(size.width as f32, size.height as f32),
        );
        swarm.set_pixel_scale(window.scale_factor() as f32);
        self.instances = swarm.instance_buffers();
        self.input.set_window_size(size.width, size.height);

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                gpu_state.device(),
                gpu_state.surface_format(),
                &window,
            ));
        }

        window.request_redraw();
        self.swarm = Some(swarm);
        self.gpu_state = Some(gpu_state);
        self.window = Some(window);
        self.time = Time::new();
        Ok(())
    }

    fn current_screen(&self) -> Screen {
        let (width, height) = self.input.window_size();
        Screen::new(width as f32, height as f32)
    }

    fn handle_shortcuts(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(feature = "egui")]
        if self.input.key_pressed(KeyCode::F1) {
            self.panel.toggle();
        }
        if self.input.key_pressed(KeyCode::Escape) {
            event_loop.exit();
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.time.toggle_pause();
            log::info!("{}", if self.time.is_paused() { "paused" } else { "resumed" });
        }
        if self.input.key_pressed(KeyCode::KeyR) {
            let screen = self.current_screen();
            if let Some(swarm) = &mut self.swarm {
                swarm.scatter(screen);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.handle_shortcuts(event_loop);

        let (Some(window), Some(gpu_state), Some(swarm)) =
            (&self.window, &mut self.gpu_state, &mut self.swarm)
        else {
            return;
        };

        let size = window.inner_size();
        let screen = Screen::new(size.width as f32, size.height as f32);
        if screen.is_empty() {
            // minimised
            self.input.end_frame();
            return;
        }

        let scale = window.scale_factor() as f32;
        let elapsed = self.time.update();

        #[cfg(feature = "egui")]
        let egui_output = match self.egui.as_mut() {
            Some(egui) => {
                egui.begin_frame(window);
                let status = PanelStatus {
                    fps: self.time.fps(),
                    total: swarm.len(),
                    stats: self.stats,
                    paused: self.time.is_paused(),
                };
                self.panel
                    .show(&egui.ctx, &mut self.tuning, &mut self.filters, &status);
                Some(egui.end_frame(window))
            }
            None => None,
        };

        let frame = Frame {
            time: elapsed,
            screen,
            pointer: self.input.pointer(),
        };
        swarm.set_pixel_scale(scale);
        self.stats = swarm.update(&frame, &self.tuning, &mut self.instances);
        if self.stats.activated > 0 || self.stats.deactivated > 0 {
            log::trace!(
                "frame {}: +{} -{} ({} forced), {} lit",
                self.time.frame(),
                self.stats.activated,
                self.stats.deactivated,
                self.stats.forced,
                self.stats.active
            );
        }

        let pointer = self.input.pointer_normalized();
        let uniforms = SpriteUniforms {
            resolution: [screen.width, screen.height],
            pointer: pointer.to_array(),
            pointer_velocity: self.input.pointer_velocity_normalized(),
            time: elapsed,
            cell_size: self.config.cell_size * scale,
            _padding: 0.0,
            tint: [1.0; 4],
        };

        #[cfg(feature = "egui")]
        let result = gpu_state.render(
            &self.instances,
            &uniforms,
            &self.filters,
            scale,
            |device, queue, encoder, view| {
                if let (Some(egui), Some(output)) = (self.egui.as_mut(), egui_output.as_ref()) {
                    let screen_descriptor = egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [size.width, size.height],
                        pixels_per_point: output.pixels_per_point,
                    };
                    egui.paint(device, queue, encoder, view, output, &screen_descriptor);
                }
            },
        );
        #[cfg(not(feature = "egui"))]
        let result = gpu_state.render(&self.instances, &uniforms, &self.filters, scale, |_, _, _, _| {});

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }

        #[cfg(feature = "egui")]
        if let (Some(egui), Some(output)) = (self.egui.as_mut(), egui_output.as_ref()) {
            egui.cleanup(output);
        }

        if self.time.frame() % TITLE_INTERVAL == 0 {
            window.set_title(&format!(
                "{} | {:.0} fps | {} lit",
                self.title,
                self.time.fps(),
                self.stats.active
            ));
        }

        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                log::error!("failed to start: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let (Some(egui), Some(window)) = (self.egui.as_mut(), self.window.as_ref()) {
            let consumed = egui.on_window_event(window, &event);
            // The field keeps tracking the pointer under the panel; only
            // keys typed into a widget are withheld.
            if consumed && matches!(event, WindowEvent::KeyboardInput { .. }) {
                return;
            }
        }

        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let sim = Simulation::new();
        assert_eq!(sim.config().particle_count, 5000);
        assert_eq!(sim.tuning(), Tuning::default());
        assert_eq!(sim.filters(), &Filters::default());
        assert_eq!(sim.sprite, SpriteSource::Procedural);
    }

    #[test]
    fn test_builder_clamps_tuning() {
        let sim = Simulation::new()
            .with_angle_mult(500.0)
            .with_max_travel_dist(-3.0);
        assert_eq!(sim.tuning().angle_mult, 200.0);
        assert_eq!(sim.tuning().max_travel_dist, 0.0);
    }

    #[test]
    fn test_without_filters_keeps_background() {
        let sim = Simulation::new().with_background(0x102030).without_filters();
        assert!(!sim.filters().bloom.enabled);
        assert!(!sim.filters().glow.enabled);
        assert_eq!(sim.filters().background, 0x102030);
    }

    #[test]
    fn test_run_rejects_invalid_config_before_opening_window() {
        let err = Simulation::new().with_particle_count(0).run().unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));

        let bloom = BloomConfig {
            kernel_size: 4,
            ..Default::default()
        };
        let err = Simulation::new().with_bloom(bloom).run().unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn test_run_reports_missing_sprite_file() {
        let err = Simulation::new()
            .with_sprite_file("no/such/sprite.png")
            .run()
            .unwrap_err();
        assert!(matches!(err, SimulationError::Texture(_)));
    }
}
