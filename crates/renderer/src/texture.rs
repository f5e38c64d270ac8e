//! Texture atlas loading for explosion billboards. Model loading, billboard
//! texturing, and skybox drawing are external-collaborator adapters; this
//! module implements the load-and-upload half of that contract (decode + GPU
//! upload) without wiring sampling into the billboard shader, which stays untextured
//! (a flat, camera-facing falloff) until an external caller needs more.

use std::path::Path;

use anyhow::{Context, Result};

/// A decoded and GPU-uploaded image, referenced by its atlas handle.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let img = image::open(path).with_context(|| format!("loading atlas {path:?}"))?.to_rgba8();
        let (width, height) = img.dimensions();

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Atlas Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &img,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self { texture, view, sampler, width, height })
    }
}
