//! Bloom and glow filter chain.
//!
//! The sprite pass draws into an offscreen scene texture. Bloom blurs that
//! texture with ping-pong separable Gaussian passes; the composite pass then
//! lays the scene over the background, adds the blurred copy and computes the
//! glow from the scene's coverage before writing to the surface.

use crate::config::{target_color, BloomConfig, Filters};
use crate::shader::{self, BlurUniforms, CompositeUniforms};

/// A colour target that the next pass can sample.
struct RenderTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Bind groups that depend on the render targets, rebuilt on resize.
struct TargetBindings {
    /// scene -> ping, horizontal
    scene_h: wgpu::BindGroup,
    /// ping -> pong, vertical
    ping_v: wgpu::BindGroup,
    /// pong -> ping, horizontal
    pong_h: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

pub struct PostProcess {
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sampler: wgpu::Sampler,

    scene: RenderTarget,
    ping: RenderTarget,
    pong: RenderTarget,

    blur_layout: wgpu::BindGroupLayout,
    blur_pipeline: wgpu::RenderPipeline,
    blur_h_uniforms: wgpu::Buffer,
    blur_v_uniforms: wgpu::Buffer,

    composite_layout: wgpu::BindGroupLayout,
    composite_pipeline: wgpu::RenderPipeline,
    composite_uniforms: wgpu::Buffer,

    bindings: TargetBindings,
    /// Horizontal + vertical rounds to run this frame; 0 skips bloom.
    blur_rounds: u32,
}

impl PostProcess {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post-Process Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let scene = RenderTarget::new(device, "Scene Texture", width, height, format);
        let ping = RenderTarget::new(device, "Bloom Ping Texture", width, height, format);
        let pong = RenderTarget::new(device, "Bloom Pong Texture", width, height, format);

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blur Bind Group Layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
            ],
        });

        let uniform_buffer = |label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BlurUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let blur_h_uniforms = uniform_buffer("Blur H Uniforms");
        let blur_v_uniforms = uniform_buffer("Blur V Uniforms");
        let composite_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Composite Uniforms"),
            size: std::mem::size_of::<CompositeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let blur_pipeline = fullscreen_pipeline(
            device,
            "Blur",
            &shader::blur_shader(),
            &blur_layout,
            format,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Composite",
            &shader::composite_shader(),
            &composite_layout,
            format,
        );

        let bindings = create_bindings(
            device,
            &blur_layout,
            &composite_layout,
            &sampler,
            [&scene, &ping, &pong],
            [&blur_h_uniforms, &blur_v_uniforms, &composite_uniforms],
        );

        Self {
            format,
            width,
            height,
            sampler,
            scene,
            ping,
            pong,
            blur_layout,
            blur_pipeline,
            blur_h_uniforms,
            blur_v_uniforms,
            composite_layout,
            composite_pipeline,
            composite_uniforms,
            bindings,
            blur_rounds: 0,
        }
    }

    /// View the sprite pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.view
    }

    /// Recreate the render targets at a new size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.scene = RenderTarget::new(device, "Scene Texture", width, height, self.format);
        self.ping = RenderTarget::new(device, "Bloom Ping Texture", width, height, self.format);
        self.pong = RenderTarget::new(device, "Bloom Pong Texture", width, height, self.format);
        self.bindings = create_bindings(
            device,
            &self.blur_layout,
            &self.composite_layout,
            &self.sampler,
            [&self.scene, &self.ping, &self.pong],
            [
                &self.blur_h_uniforms,
                &self.blur_v_uniforms,
                &self.composite_uniforms,
            ],
        );
    }

    /// Upload this frame's filter settings.
    ///
    /// `scale` converts the logical-pixel distances in `filters` to physical
    /// pixels; `srgb_target` selects whether colours are linearised.
    pub fn prepare(&mut self, queue: &wgpu::Queue, filters: &Filters, scale: f32, srgb_target: bool) {
        let (width, height) = (self.width, self.height);
        queue.write_buffer(
            &self.blur_h_uniforms,
            0,
            bytemuck::bytes_of(&blur_uniforms(width, height, &filters.bloom, scale, [1.0, 0.0])),
        );
        queue.write_buffer(
            &self.blur_v_uniforms,
            0,
            bytemuck::bytes_of(&blur_uniforms(width, height, &filters.bloom, scale, [0.0, 1.0])),
        );
        queue.write_buffer(
            &self.composite_uniforms,
            0,
            bytemuck::bytes_of(&composite_uniforms(width, height, filters, scale, srgb_target)),
        );
        self.blur_rounds = if filters.bloom.enabled {
            filters.bloom.quality.max(1)
        } else {
            0
        };
    }

    /// Run the blur rounds and composite into `output`.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        for round in 0..self.blur_rounds {
            let horizontal = if round == 0 {
                &self.bindings.scene_h
            } else {
                &self.bindings.pong_h
            };
            fullscreen_pass(encoder, "Bloom Blur H", &self.ping.view, &self.blur_pipeline, horizontal);
            fullscreen_pass(
                encoder,
                "Bloom Blur V",
                &self.pong.view,
                &self.blur_pipeline,
                &self.bindings.ping_v,
            );
        }

        fullscreen_pass(
            encoder,
            "Composite Pass",
            output,
            &self.composite_pipeline,
            &self.bindings.composite,
        );
    }
}

pub(crate) fn blur_uniforms(
    width: u32,
    height: u32,
    bloom: &BloomConfig,
    scale: f32,
    direction: [f32; 2],
) -> BlurUniforms {
    BlurUniforms {
        texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
        direction,
        spacing: bloom.tap_spacing() * scale.max(0.0),
        radius: (bloom.kernel_size / 2) as f32,
        _padding: [0.0; 2],
    }
}

/// Disabled filters zero their strengths so the composite shader stays
/// branch-free.
pub(crate) fn composite_uniforms(
    width: u32,
    height: u32,
    filters: &Filters,
    scale: f32,
    srgb_target: bool,
) -> CompositeUniforms {
    let glow = &filters.glow;
    let (outer, inner) = if glow.enabled {
        (glow.outer_strength, glow.inner_strength)
    } else {
        (0.0, 0.0)
    };
    CompositeUniforms {
        texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
        bloom_intensity: if filters.bloom.enabled {
            filters.bloom.intensity
        } else {
            0.0
        },
        glow_distance: glow.distance * scale.max(0.0),
        glow_color: target_color(glow.color, srgb_target).to_array(),
        background: target_color(filters.background, srgb_target).to_array(),
        glow_outer: outer,
        glow_inner: inner,
        _padding: [0.0; 2],
    }
}

fn create_bindings(
    device: &wgpu::Device,
    blur_layout: &wgpu::BindGroupLayout,
    composite_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    [scene, ping, pong]: [&RenderTarget; 3],
    [blur_h, blur_v, composite_buffer]: [&wgpu::Buffer; 3],
) -> TargetBindings {
    let blur_group = |label, source: &RenderTarget, uniforms: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: blur_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    };

    let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Composite Bind Group"),
        layout: composite_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&scene.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&pong.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: composite_buffer.as_entire_binding(),
            },
        ],
    });

    TargetBindings {
        scene_h: blur_group("Blur Scene H Bind Group", scene, blur_h),
        ping_v: blur_group("Blur Ping V Bind Group", ping, blur_v),
        pong_h: blur_group("Blur Pong H Bind Group", pong, blur_h),
        composite,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
