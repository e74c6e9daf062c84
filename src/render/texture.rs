use std::collections::HashMap;
use std::path::Path;

/// Decoded RGBA8 pixels ready for upload.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Longest side uploaded for a tile image. Tiles span a few hundred pixels,
/// so larger textures only cost memory.
pub const TILE_TEXTURE_MAX_DIM: u32 = 2048;

/// Decode an image file to RGBA8, downscaling (aspect preserved) so neither
/// side exceeds `max_dimension`. Errors are returned as display strings for logging.
pub fn decode_image(path: &Path, max_dimension: u32) -> Result<DecodedImage, String> {
    let img = image::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(format!("{}: empty image", path.display()));
    }

    let max_dimension = max_dimension.max(1);
    let img = if img.width() > max_dimension || img.height() > max_dimension {
        log::debug!(
            "{}: downscaling {}x{} to fit {max_dimension}",
            path.display(),
            img.width(),
            img.height()
        );
        img.resize(max_dimension, max_dimension, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// One bind group (texture + sampler) per distinct image source.
///
/// Sources that fail to load are remembered as `None` so they are only tried
/// once; tiles showing them fall back to the placeholder.
pub struct TextureLibrary {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback: wgpu::BindGroup,
    entries: HashMap<String, Option<wgpu::BindGroup>>,
    max_dimension: u32,
}

impl TextureLibrary {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tile texture bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tile sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = DecodedImage {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        let fallback = Self::create_bind_group(device, queue, &layout, &sampler, &white, "placeholder texture");

        Self {
            layout,
            sampler,
            fallback,
            entries: HashMap::new(),
            max_dimension: device.limits().max_texture_dimension_2d.min(TILE_TEXTURE_MAX_DIM),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn fallback(&self) -> &wgpu::BindGroup {
        &self.fallback
    }

    /// Make sure `src` has been attempted. Returns whether a texture is available.
    pub fn ensure(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, src: &str, path: Option<&Path>) -> bool {
        if let Some(entry) = self.entries.get(src) {
            return entry.is_some();
        }
        let entry = match path.map(|p| decode_image(p, self.max_dimension)) {
            Some(Ok(decoded)) => {
                log::debug!("loaded {src} ({}x{})", decoded.width, decoded.height);
                Some(Self::create_bind_group(device, queue, &self.layout, &self.sampler, &decoded, src))
            }
            Some(Err(e)) => {
                log::warn!("Failed to load image {e}. Showing placeholder.");
                None
            }
            None => None,
        };
        let loaded = entry.is_some();
        self.entries.insert(src.to_string(), entry);
        loaded
    }

    /// The bind group for `src`, or the placeholder when it is missing or failed.
    pub fn bind_group(&self, src: &str) -> &wgpu::BindGroup {
        self.entries
            .get(src)
            .and_then(Option::as_ref)
            .unwrap_or(&self.fallback)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &DecodedImage,
        label: &str,
    ) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tiny.png");
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("save png");

        let decoded = decode_image(&path, TILE_TEXTURE_MAX_DIM).expect("decode");
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_missing_file_reports_path() {
        let err = decode_image(Path::new("/nonexistent/domefit/missing.png"), TILE_TEXTURE_MAX_DIM).err().expect("error");
        assert!(err.contains("missing.png"));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("write");
        assert!(decode_image(&path, TILE_TEXTURE_MAX_DIM).is_err());
    }

    #[test]
    fn test_decode_downscales_to_fit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(3000, 1000, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .expect("save png");

        let decoded = decode_image(&path, 1024).expect("decode");
        assert_eq!(decoded.width, 1024);
        assert!((340..=342).contains(&decoded.height), "height = {}", decoded.height);
        assert_eq!(decoded.pixels.len(), (decoded.width * decoded.height * 4) as usize);
    }

    #[test]
    fn test_decode_panorama_beyond_device_limit() {
        // Wider than the 8192 px default wgpu texture limit.
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("panorama.png");
        image::RgbaImage::new(9000, 4).save(&path).expect("save png");

        let decoded = decode_image(&path, 8192).expect("decode");
        assert_eq!(decoded.width, 8192);
        assert!(decoded.height >= 1 && decoded.height <= 4);

        let capped = decode_image(&path, TILE_TEXTURE_MAX_DIM).expect("decode");
        assert_eq!(capped.width, TILE_TEXTURE_MAX_DIM);
    }
}
