//! Sprite texture loading.
//!
//! Every instance samples the same sprite. It can be loaded from an image
//! file (PNG or JPEG) or generated as a soft radial dot when no asset is
//! supplied.
//!
//! ```ignore
//! let sprite = SpriteTexture::from_file("assets/dot.png")?;
//! Simulation::new().with_sprite(sprite).run()?;
//! ```

use std::path::Path;

use crate::error::TextureError;

/// RGBA8 pixel data for the sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTexture {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SpriteTexture {
    /// Wrap raw RGBA data.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a sprite from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?.into_rgba8();
        let (width, height) = img.dimensions();
        log::info!("loaded sprite {} ({}x{})", path.display(), width, height);
        Self::from_rgba(img.into_raw(), width, height)
    }

    /// White dot with a smooth falloff towards the edge.
    ///
    /// Colour is premultiplied-friendly: RGB stays white and only alpha fades.
    pub fn soft_dot(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let center = size as f32 / 2.0;

        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5 - center) / center;
                let dy = (y as f32 + 0.5 - center) / center;
                let dist = (dx * dx + dy * dy).sqrt();
                let falloff = (1.0 - dist).clamp(0.0, 1.0);
                // smoothstep for a soft rim
                let alpha = falloff * falloff * (3.0 - 2.0 * falloff);
                data.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
            }
        }

        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Bytes per row, as expected by the GPU upload.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

impl Default for SpriteTexture {
    fn default() -> Self {
        Self::soft_dot(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_size() {
        let ok = SpriteTexture::from_rgba(vec![0; 16], 2, 2);
        assert!(ok.is_ok());

        let err = SpriteTexture::from_rgba(vec![0; 15], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TextureError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        ));

        let empty = SpriteTexture::from_rgba(Vec::new(), 0, 4).unwrap_err();
        assert!(matches!(empty, TextureError::Empty { width: 0, height: 4 }));
    }

    #[test]
    fn test_soft_dot_fades_to_edge() {
        let dot = SpriteTexture::soft_dot(16);
        assert_eq!(dot.data.len(), 16 * 16 * 4);
        assert_eq!(dot.bytes_per_row(), 64);

        let alpha_at = |x: u32, y: u32| dot.data[((y * 16 + x) * 4 + 3) as usize];
        assert!(alpha_at(8, 8) > 200);
        assert_eq!(alpha_at(0, 0), 0);
        assert!(alpha_at(8, 8) > alpha_at(12, 8));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SpriteTexture::from_file("definitely/not/here.png");
        assert!(matches!(result, Err(TextureError::ImageLoad(_))));
    }
}
