use std::marker::PhantomData;
use std::mem;

use bytemuck::Pod;
use log::debug;

use crate::Bindable;

/// A typed uniform buffer; created with its initial contents and rewritten
/// in place (never reallocated) when the host-side value changes.
#[derive(Debug)]
pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T> UniformBuffer<T>
where
    T: Pod,
{
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>, init: &T) -> Self {
        let label = label.as_ref();

        debug!(
            "Allocating uniform buffer `umbra_{}`: {} bytes",
            label,
            mem::size_of::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("umbra_{label}")),
            size: mem::size_of::<T>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });

        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::bytes_of(init));

        buffer.unmap();

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }

    pub fn bind_readable(&self) -> impl Bindable + '_ {
        UniformBufferBinder { parent: self }
    }
}

struct UniformBufferBinder<'a, T> {
    parent: &'a UniformBuffer<T>,
}

impl<T> Bindable for UniformBufferBinder<'_, T> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT
                .union(wgpu::ShaderStages::COMPUTE),
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        vec![(layout, self.parent.buffer.as_entire_binding())]
    }
}
