use fxhash::FxHashMap;
use log::debug;

use crate::{ImageHandle, Images};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

/// Host-side material description.
#[derive(Clone, Copy, Debug)]
pub struct MaterialDesc {
    pub diffuse: Option<ImageHandle>,
    pub specular: Option<ImageHandle>,
    pub shininess: f32,
    pub roughness: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse: None,
            specular: None,
            shininess: 32.0,
            roughness: 0.6,
        }
    }
}

#[derive(Debug)]
pub struct Material {
    bind_group: wgpu::BindGroup,
    shininess: f32,
    roughness: f32,
}

impl Material {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }
}

/// Material registry. Every material gets a bind group over the shared
/// layout (diffuse texture + sampler, specular texture + sampler), so any
/// lighting pipeline can bind any material at group 1.
#[derive(Debug)]
pub struct Materials {
    items: FxHashMap<MaterialHandle, Material>,
    layout: wgpu::BindGroupLayout,
    default: Material,
    next_id: u32,
}

impl Materials {
    pub fn new(device: &wgpu::Device, images: &Images) -> Self {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        };

        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("umbra_material_layout"),
                entries: &[
                    texture_entry(0),
                    sampler_entry(1),
                    texture_entry(2),
                    sampler_entry(3),
                ],
            });

        let default =
            Self::build(device, &layout, images, MaterialDesc::default());

        Self {
            items: Default::default(),
            layout,
            default,
            next_id: 0,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn add(
        &mut self,
        device: &wgpu::Device,
        images: &Images,
        desc: MaterialDesc,
    ) -> MaterialHandle {
        let handle = MaterialHandle(self.next_id);

        self.next_id += 1;

        debug!("Creating material {:?}: {:?}", handle, desc);

        let material = Self::build(device, &self.layout, images, desc);

        self.items.insert(handle, material);

        handle
    }

    /// The material for `handle`, or the default (white, shininess 32).
    pub fn get_or_default(&self, handle: MaterialHandle) -> &Material {
        self.items.get(&handle).unwrap_or(&self.default)
    }

    fn build(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        images: &Images,
        desc: MaterialDesc,
    ) -> Material {
        let diffuse = images.get_or_white(desc.diffuse);
        let specular = images.get_or_white(desc.specular);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra_material"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(diffuse.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(diffuse.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(specular.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(specular.sampler()),
                },
            ],
        });

        Material {
            bind_group,
            shininess: desc.shininess,
            roughness: desc.roughness,
        }
    }
}
