use glam::{UVec2, UVec3};
use log::debug;

use crate::Bindable;

/// A texture plus the views and sampler the passes bind. Everything is
/// allocated up front: the full-resource view, one view per mip level (for
/// storage writes) and one view per layer (for cubemap face targets).
#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    format: wgpu::TextureFormat,
    view_dimension: wgpu::TextureViewDimension,
    filtering: bool,
    mip_views: Vec<wgpu::TextureView>,
    layer_views: Vec<wgpu::TextureView>,
    size: wgpu::Extent3d,
}

impl Texture {
    pub fn builder(label: impl ToString) -> TextureBuilder {
        TextureBuilder {
            label: label.to_string(),
            size: wgpu::Extent3d::default(),
            dimension: wgpu::TextureDimension::D2,
            view_dimension: wgpu::TextureViewDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::empty(),
            mip_level_count: 1,
            filter: wgpu::FilterMode::Nearest,
        }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn size(&self) -> wgpu::Extent3d {
        self.size
    }

    pub fn mip_level_count(&self) -> u32 {
        self.tex.mip_level_count()
    }

    /// View restricted to a single mip level.
    pub fn mip_view(&self, mip: u32) -> &wgpu::TextureView {
        &self.mip_views[mip as usize]
    }

    /// View restricted to a single array layer (a cubemap face).
    pub fn layer_view(&self, layer: u32) -> &wgpu::TextureView {
        &self.layer_views[layer as usize]
    }

    /// Binds the texture for sampling together with its sampler.
    pub fn bind_sampled(&self) -> impl Bindable + '_ {
        SampledTexture { parent: self }
    }

    /// Binds the texture alone, for `textureLoad` access.
    pub fn bind_readable(&self) -> impl Bindable + '_ {
        ReadableTexture { parent: self }
    }

    /// Binds a single mip level for `textureLoad` access; keeps the level
    /// being written by the same pass out of the read binding.
    pub fn bind_readable_mip(&self, mip: u32) -> impl Bindable + '_ {
        ReadableMipTexture { parent: self, mip }
    }

    /// Binds a depth texture plus a non-filtering sampler.
    pub fn bind_depth(&self) -> impl Bindable + '_ {
        DepthTexture { parent: self }
    }

    /// Binds one mip level as a write-only storage texture.
    pub fn bind_storage(&self, mip: u32) -> impl Bindable + '_ {
        StorageTexture { parent: self, mip }
    }
}

pub struct TextureBuilder {
    label: String,
    size: wgpu::Extent3d,
    dimension: wgpu::TextureDimension,
    view_dimension: wgpu::TextureViewDimension,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
    mip_level_count: u32,
    filter: wgpu::FilterMode,
}

impl TextureBuilder {
    pub fn with_size(mut self, size: UVec2) -> Self {
        self.size = wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        };
        self
    }

    pub fn with_size_3d(mut self, size: UVec3) -> Self {
        self.size = wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: size.z,
        };
        self.dimension = wgpu::TextureDimension::D3;
        self.view_dimension = wgpu::TextureViewDimension::D3;
        self
    }

    /// A cubemap: six square layers of the given edge length.
    pub fn with_cube_size(mut self, edge: u32) -> Self {
        self.size = wgpu::Extent3d {
            width: edge,
            height: edge,
            depth_or_array_layers: 6,
        };
        self.dimension = wgpu::TextureDimension::D2;
        self.view_dimension = wgpu::TextureViewDimension::Cube;
        self
    }

    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_usage(mut self, usage: wgpu::TextureUsages) -> Self {
        self.usage |= usage;
        self
    }

    pub fn with_mips(mut self, mip_level_count: u32) -> Self {
        self.mip_level_count = mip_level_count;
        self
    }

    pub fn with_linear_filtering(mut self) -> Self {
        self.filter = wgpu::FilterMode::Linear;
        self
    }

    pub fn build(self, device: &wgpu::Device) -> Texture {
        let label = format!("umbra_{}", self.label);

        debug!(
            "Allocating texture `{}`: {}x{}x{}, {:?}, {} mips",
            label,
            self.size.width,
            self.size.height,
            self.size.depth_or_array_layers,
            self.format,
            self.mip_level_count,
        );

        assert!(self.size.width > 0 && self.size.height > 0);

        // Depth formats only ever get a non-filtering sampler.
        let filter = if self.format.is_depth_stencil_format() {
            wgpu::FilterMode::Nearest
        } else {
            self.filter
        };

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: self.size,
            mip_level_count: self.mip_level_count,
            sample_count: 1,
            dimension: self.dimension,
            format: self.format,
            usage: self.usage,
            view_formats: &[],
        });

        let view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_view")),
            dimension: Some(self.view_dimension),
            ..Default::default()
        });

        // Cubemaps get face views instead; per-mip views only make sense
        // for the storage-written 2D/3D textures.
        let mip_views = if self.view_dimension == wgpu::TextureViewDimension::Cube
        {
            Vec::new()
        } else {
            (0..self.mip_level_count)
                .map(|mip| {
                    tex.create_view(&wgpu::TextureViewDescriptor {
                        label: Some(&format!("{label}_mip{mip}")),
                        dimension: Some(self.view_dimension),
                        base_mip_level: mip,
                        mip_level_count: Some(1),
                        ..Default::default()
                    })
                })
                .collect()
        };

        let layer_views = if self.view_dimension == wgpu::TextureViewDimension::Cube
        {
            (0..6)
                .map(|layer| {
                    tex.create_view(&wgpu::TextureViewDescriptor {
                        label: Some(&format!("{label}_face{layer}")),
                        dimension: Some(wgpu::TextureViewDimension::D2),
                        base_array_layer: layer,
                        array_layer_count: Some(1),
                        ..Default::default()
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label}_sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: filter,
            ..Default::default()
        });

        Texture {
            tex,
            view,
            sampler,
            format: self.format,
            view_dimension: self.view_dimension,
            filtering: filter == wgpu::FilterMode::Linear,
            mip_views,
            layer_views,
            size: self.size,
        }
    }
}

const STAGES: wgpu::ShaderStages =
    wgpu::ShaderStages::FRAGMENT.union(wgpu::ShaderStages::COMPUTE);

struct SampledTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for SampledTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: STAGES,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: self.parent.view_dimension,
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: self.parent.filtering,
                },
            },
            count: None,
        };

        let sampler_layout = wgpu::BindGroupLayoutEntry {
            binding: binding + 1,
            visibility: STAGES,
            ty: wgpu::BindingType::Sampler(if self.parent.filtering {
                wgpu::SamplerBindingType::Filtering
            } else {
                wgpu::SamplerBindingType::NonFiltering
            }),
            count: None,
        };

        vec![
            (
                tex_layout,
                wgpu::BindingResource::TextureView(&self.parent.view),
            ),
            (
                sampler_layout,
                wgpu::BindingResource::Sampler(&self.parent.sampler),
            ),
        ]
    }
}

struct ReadableTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for ReadableTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: STAGES,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: self.parent.view_dimension,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        };

        vec![(
            layout,
            wgpu::BindingResource::TextureView(&self.parent.view),
        )]
    }
}

struct ReadableMipTexture<'a> {
    parent: &'a Texture,
    mip: u32,
}

impl Bindable for ReadableMipTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: STAGES,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: match self.parent.view_dimension {
                    wgpu::TextureViewDimension::D3 => {
                        wgpu::TextureViewDimension::D3
                    }
                    _ => wgpu::TextureViewDimension::D2,
                },
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        };

        vec![(
            layout,
            wgpu::BindingResource::TextureView(self.parent.mip_view(self.mip)),
        )]
    }
}

struct DepthTexture<'a> {
    parent: &'a Texture,
}

impl Bindable for DepthTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let tex_layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: STAGES,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: self.parent.view_dimension,
                sample_type: wgpu::TextureSampleType::Depth,
            },
            count: None,
        };

        let sampler_layout = wgpu::BindGroupLayoutEntry {
            binding: binding + 1,
            visibility: STAGES,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
            count: None,
        };

        vec![
            (
                tex_layout,
                wgpu::BindingResource::TextureView(&self.parent.view),
            ),
            (
                sampler_layout,
                wgpu::BindingResource::Sampler(&self.parent.sampler),
            ),
        ]
    }
}

struct StorageTexture<'a> {
    parent: &'a Texture,
    mip: u32,
}

impl Bindable for StorageTexture<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: STAGES,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: self.parent.format,
                view_dimension: match self.parent.view_dimension {
                    wgpu::TextureViewDimension::D3 => wgpu::TextureViewDimension::D3,
                    _ => wgpu::TextureViewDimension::D2,
                },
            },
            count: None,
        };

        vec![(
            layout,
            wgpu::BindingResource::TextureView(self.parent.mip_view(self.mip)),
        )]
    }
}
