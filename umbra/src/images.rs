use fxhash::FxHashMap;
use glam::uvec2;
use log::debug;

use crate::Texture;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(u32);

/// Texture assets for materials. Images decode on the CPU and upload once
/// at registration; a 1×1 white fallback covers materials with no texture
/// assigned.
#[derive(Debug)]
pub struct Images {
    items: FxHashMap<ImageHandle, Texture>,
    white: Texture,
    next_id: u32,
}

impl Images {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = upload_rgba8(device, queue, "white", 1, 1, &[255; 4]);

        Self {
            items: Default::default(),
            white,
            next_id: 0,
        }
    }

    /// Decodes an encoded image (PNG/JPEG) and uploads it.
    pub fn add_from_memory(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
    ) -> Result<ImageHandle, image::ImageError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();

        Ok(self.add_rgba8(device, queue, image.width(), image.height(), &image))
    }

    /// Loads an image from an (opaque) filesystem path and uploads it.
    pub fn add_from_path(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<std::path::Path>,
    ) -> Result<ImageHandle, image::ImageError> {
        let image = image::open(path)?.to_rgba8();

        Ok(self.add_rgba8(device, queue, image.width(), image.height(), &image))
    }

    /// Uploads raw RGBA8 pixels.
    pub fn add_rgba8(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> ImageHandle {
        let handle = ImageHandle(self.next_id);

        self.next_id += 1;

        debug!("Uploading image {:?}: {}x{}", handle, width, height);

        let texture = upload_rgba8(device, queue, "image", width, height, pixels);

        self.items.insert(handle, texture);

        handle
    }

    /// The texture for `handle`, or the white fallback.
    pub fn get_or_white(&self, handle: Option<ImageHandle>) -> &Texture {
        handle
            .and_then(|handle| self.items.get(&handle))
            .unwrap_or(&self.white)
    }
}

fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Texture {
    assert_eq!(pixels.len(), (width * height * 4) as usize);

    let texture = Texture::builder(label)
        .with_size(uvec2(width, height))
        .with_format(wgpu::TextureFormat::Rgba8UnormSrgb)
        .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
        .with_usage(wgpu::TextureUsages::COPY_DST)
        .with_linear_filtering()
        .build(device);

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: texture.tex(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: None,
        },
        texture.size(),
    );

    texture
}
