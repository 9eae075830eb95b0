//! Validates every generated WGSL module with naga.

use trifield::shader::{
    blur_shader, composite_shader, sprite_shader, BlurUniforms, CompositeUniforms, SpriteUniforms,
};

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn entry_points(module: &naga::Module) -> Vec<(String, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.clone(), ep.stage))
        .collect()
}

/// Size of the uniform struct bound at `@group(0) @binding(binding)`.
fn uniform_size(module: &naga::Module, binding: u32) -> Option<u32> {
    let layouter = {
        let mut layouter = naga::proc::Layouter::default();
        layouter.update(module.to_ctx()).ok()?;
        layouter
    };
    module.global_variables.iter().find_map(|(_, var)| {
        let bound = var.binding.as_ref()?;
        if var.space == naga::AddressSpace::Uniform && bound.group == 0 && bound.binding == binding {
            Some(layouter[var.ty].size)
        } else {
            None
        }
    })
}

// ============================================================================
// Parse + validate
// ============================================================================

#[test]
fn test_sprite_shader_validates() {
    let module = validate_wgsl(&sprite_shader()).unwrap();
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main".to_string(), naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main".to_string(), naga::ShaderStage::Fragment)));
}

#[test]
fn test_blur_shader_validates() {
    let module = validate_wgsl(&blur_shader()).unwrap();
    assert_eq!(entry_points(&module).len(), 2);
}

#[test]
fn test_composite_shader_validates() {
    let module = validate_wgsl(&composite_shader()).unwrap();
    assert_eq!(entry_points(&module).len(), 2);
}

// ============================================================================
// Uniform layout matches the Rust mirrors
// ============================================================================

#[test]
fn test_uniform_layouts_match() {
    let sprite = validate_wgsl(&sprite_shader()).unwrap();
    assert_eq!(
        uniform_size(&sprite, 0),
        Some(std::mem::size_of::<SpriteUniforms>() as u32)
    );

    let blur = validate_wgsl(&blur_shader()).unwrap();
    assert_eq!(
        uniform_size(&blur, 2),
        Some(std::mem::size_of::<BlurUniforms>() as u32)
    );

    let composite = validate_wgsl(&composite_shader()).unwrap();
    assert_eq!(
        uniform_size(&composite, 3),
        Some(std::mem::size_of::<CompositeUniforms>() as u32)
    );
}
