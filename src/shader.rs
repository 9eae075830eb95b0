//! WGSL sources and the uniform blocks that feed them.
//!
//! Three programs make up a frame:
//!
//! - the instanced sprite shader, one quad per particle positioned by the
//!   instance offset buffer and faded by the instance alpha buffer;
//! - a separable Gaussian blur used by the bloom passes;
//! - a composite pass that lays the scene over the background, adds the
//!   blurred bloom copy and draws the glow.
//!
//! The uniform structs here are `#[repr(C)]` mirrors of the WGSL structs;
//! field order and sizes must match exactly.

use bytemuck::{Pod, Zeroable};

/// Per-vertex data of the sprite quad, in cell units.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
    pub uv: [f32; 2],
}

/// Two triangles covering the unit cell.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { corner: [0.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0], uv: [1.0, 1.0] },
    QuadVertex { corner: [1.0, 1.0], uv: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0], uv: [0.0, 1.0] },
    QuadVertex { corner: [0.0, 0.0], uv: [0.0, 0.0] },
];

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    /// Render target size in pixels.
    pub resolution: [f32; 2],
    /// Pointer position divided by the window size.
    pub pointer: [f32; 2],
    /// Pointer displacement this frame divided by the window width.
    pub pointer_velocity: f32,
    pub time: f32,
    /// Quad edge length in pixels.
    pub cell_size: f32,
    pub _padding: f32,
    pub tint: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BlurUniforms {
    /// One over the texture size.
    pub texel: [f32; 2],
    /// `(1, 0)` for horizontal, `(0, 1)` for vertical.
    pub direction: [f32; 2],
    /// Pixels between taps.
    pub spacing: f32,
    /// Taps on each side of the centre.
    pub radius: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CompositeUniforms {
    pub texel: [f32; 2],
    pub bloom_intensity: f32,
    pub glow_distance: f32,
    pub glow_color: [f32; 4],
    pub background: [f32; 4],
    pub glow_outer: f32,
    pub glow_inner: f32,
    pub _padding: [f32; 2],
}

/// Instanced sprite shader.
///
/// Vertex inputs: `@location(0)` corner and `@location(1)` uv per vertex,
/// `@location(2)` offset and `@location(3)` alpha per instance.
pub fn sprite_shader() -> String {
    r#"struct SpriteUniforms {
    resolution: vec2<f32>,
    pointer: vec2<f32>,
    pointer_velocity: f32,
    time: f32,
    cell_size: f32,
    pad0: f32,
    tint: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: SpriteUniforms;
@group(0) @binding(1)
var sprite: texture_2d<f32>;
@group(0) @binding(2)
var sprite_sampler: sampler;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) offset: vec2<f32>,
    @location(3) alpha: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) alpha: f32,
    @location(2) screen_uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let pixel = in.offset + in.corner * uniforms.cell_size;
    let screen_uv = pixel / max(uniforms.resolution, vec2<f32>(1.0));

    var out: VertexOutput;
    out.clip_position = vec4<f32>(screen_uv.x * 2.0 - 1.0, 1.0 - screen_uv.y * 2.0, 0.0, 1.0);
    out.uv = in.uv;
    out.alpha = in.alpha;
    out.screen_uv = screen_uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite, sprite_sampler, in.uv);

    // Sprites close to a fast pointer flare up.
    let aspect = uniforms.resolution.x / max(uniforms.resolution.y, 1.0);
    let to_pointer = (in.screen_uv - uniforms.pointer) * vec2<f32>(aspect, 1.0);
    let near = 1.0 - smoothstep(0.0, 0.35, length(to_pointer));
    let shimmer = 0.75 + 0.25 * sin(uniforms.time * 6.0 + in.screen_uv.x * 40.0);
    let boost = 1.0 + clamp(uniforms.pointer_velocity * 40.0, 0.0, 3.0) * near * shimmer;

    let alpha = clamp(texel.a * in.alpha * uniforms.tint.a, 0.0, 1.0);
    return vec4<f32>(texel.rgb * uniforms.tint.rgb * boost, alpha);
}
"#
    .to_string()
}

/// Fullscreen triangle shared by the post-process passes.
const FULLSCREEN_VERTEX: &str = r#"struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}
"#;

/// One direction of a separable Gaussian blur.
pub fn blur_shader() -> String {
    format!(
        r#"struct BlurUniforms {{
    texel: vec2<f32>,
    direction: vec2<f32>,
    spacing: f32,
    radius: f32,
    pad0: vec2<f32>,
}};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> blur: BlurUniforms;

{FULLSCREEN_VERTEX}
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let radius = i32(blur.radius);
    let sigma = max(blur.radius * 0.5, 1.0);
    let stride = blur.direction * blur.texel * blur.spacing;

    var sum = vec4<f32>(0.0);
    var total = 0.0;
    for (var i = -radius; i <= radius; i = i + 1) {{
        let x = f32(i);
        let weight = exp(-(x * x) / (2.0 * sigma * sigma));
        sum = sum + textureSampleLevel(source, source_sampler, in.uv + stride * x, 0.0) * weight;
        total = total + weight;
    }}
    return sum / max(total, 1e-5);
}}
"#
    )
}

/// Final pass: background, scene, bloom and glow into the surface.
pub fn composite_shader() -> String {
    format!(
        r#"struct CompositeUniforms {{
    texel: vec2<f32>,
    bloom_intensity: f32,
    glow_distance: f32,
    glow_color: vec4<f32>,
    background: vec4<f32>,
    glow_outer: f32,
    glow_inner: f32,
    pad0: vec2<f32>,
}};

const GLOW_TAPS: i32 = 12;
const TAU: f32 = 6.2831853;

@group(0) @binding(0)
var scene: texture_2d<f32>;
@group(0) @binding(1)
var bloom: texture_2d<f32>;
@group(0) @binding(2)
var scene_sampler: sampler;
@group(0) @binding(3)
var<uniform> composite: CompositeUniforms;

{FULLSCREEN_VERTEX}
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    // Scene colour is premultiplied by its coverage.
    let scene_color = textureSampleLevel(scene, scene_sampler, in.uv, 0.0);
    let bloom_color = textureSampleLevel(bloom, scene_sampler, in.uv, 0.0) * composite.bloom_intensity;

    var coverage = 0.0;
    for (var i = 0; i < GLOW_TAPS; i = i + 1) {{
        let angle = f32(i) * TAU / f32(GLOW_TAPS);
        let offset = vec2<f32>(cos(angle), sin(angle)) * composite.texel * composite.glow_distance;
        coverage = coverage + textureSampleLevel(scene, scene_sampler, in.uv + offset, 0.0).a;
    }}
    coverage = coverage / f32(GLOW_TAPS);

    let own = clamp(scene_color.a, 0.0, 1.0);
    let outer = coverage * (1.0 - own) * composite.glow_outer;
    let inner = (1.0 - coverage) * own * composite.glow_inner;
    let glow_amount = clamp(outer + inner, 0.0, 4.0);
    let glow = composite.glow_color.rgb * glow_amount;

    let cover = clamp(own + bloom_color.a + glow_amount, 0.0, 1.0);
    let color = scene_color.rgb + bloom_color.rgb + glow * (1.0 - own)
        + composite.background.rgb * (1.0 - cover);
    return vec4<f32>(color, 1.0);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 48);
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 32);
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 64);
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
    }

    #[test]
    fn test_quad_covers_unit_cell() {
        let corners: Vec<_> = QUAD_VERTICES.iter().map(|v| v.corner).collect();
        assert!(corners.contains(&[0.0, 0.0]));
        assert!(corners.contains(&[1.0, 1.0]));
        assert!(QUAD_VERTICES.iter().all(|v| v.corner == v.uv));
    }

    #[test]
    fn test_post_shaders_share_vertex_stage() {
        for src in [blur_shader(), composite_shader()] {
            assert!(src.contains("fn vs_main(@builtin(vertex_index)"));
            assert!(src.contains("fn fs_main"));
            assert!(!src.contains("{{"));
        }
    }
}
