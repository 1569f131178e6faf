use crate::error::ViewerError;

/// Equirectangular HDR radiance map, linear RGB, row-major from the top.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 3]>,
}

impl EnvironmentMap {
    /// Decode a Radiance `.hdr` file.
    pub fn decode_hdr(bytes: &[u8]) -> Result<Self, ViewerError> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)?;
        let rgb = image.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| p.0).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Reinhard-tone-mapped RGBA8 (linear) for upload as a filterable texture.
    pub fn to_rgba8(&self, exposure: f32) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for c in pixel {
                let v = (c * exposure).max(0.0);
                let mapped = v / (1.0 + v);
                out.push((mapped * 255.0).round() as u8);
            }
            out.push(255);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> EnvironmentMap {
        EnvironmentMap {
            width: 2,
            height: 1,
            pixels: vec![[0.0, 1.0, 3.0], [2.0, 1.0, 1.0]],
        }
    }

    #[test]
    fn tone_mapping_stays_in_range() {
        let rgba = map().to_rgba8(1.0);
        assert_eq!(rgba.len(), 8);
        assert_eq!(rgba[0], 0);
        // 1 / (1 + 1)
        assert_eq!(rgba[1], 128);
        assert!(rgba[2] < 255);
        assert_eq!(rgba[3], 255);
    }

    #[test]
    fn garbage_is_not_an_hdr() {
        assert!(EnvironmentMap::decode_hdr(b"definitely not radiance").is_err());
    }
}
