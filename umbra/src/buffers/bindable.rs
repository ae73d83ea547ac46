/// An object that knows how to describe itself to a bind group: one or more
/// consecutive layout entries plus the matching resources, starting at the
/// given binding slot.
pub trait Bindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)>;
}
