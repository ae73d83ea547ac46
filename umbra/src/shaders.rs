use log::debug;

macro_rules! shader {
    ($device:expr, $name:literal) => {{
        debug!("Compiling shader: {}", $name);

        $device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(concat!("umbra_", $name)),
            source: wgpu::ShaderSource::Wgsl(
                include_str!(concat!("shaders/", $name, ".wgsl")).into(),
            ),
        })
    }};
}

/// Every shader module, compiled once at engine creation.
#[derive(Debug)]
pub(crate) struct Shaders {
    pub shadow_depth: wgpu::ShaderModule,
    pub cube_depth: wgpu::ShaderModule,
    pub lighting_hard_dir: wgpu::ShaderModule,
    pub lighting_hard_point: wgpu::ShaderModule,
    pub lighting_hard_spot: wgpu::ShaderModule,
    pub lighting_pcss: wgpu::ShaderModule,
    pub lighting_vsm: wgpu::ShaderModule,
    pub lighting_vssm: wgpu::ShaderModule,
    pub lighting_esm: wgpu::ShaderModule,
    pub lighting_msm: wgpu::ShaderModule,
    pub depth_moments: wgpu::ShaderModule,
    pub sat: wgpu::ShaderModule,
    pub esm_encode: wgpu::ShaderModule,
    pub gaussian_blur: wgpu::ShaderModule,
    pub msm_moments: wgpu::ShaderModule,
    pub rsm_gbuffer: wgpu::ShaderModule,
    pub rsm_lighting: wgpu::ShaderModule,
    pub rsm_lighting_pass2: wgpu::ShaderModule,
    pub voxelize: wgpu::ShaderModule,
    pub voxel_mipmap: wgpu::ShaderModule,
    pub cone_trace: wgpu::ShaderModule,
    pub voxel_debug: wgpu::ShaderModule,
    pub tonemap: wgpu::ShaderModule,
}

impl Shaders {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            shadow_depth: shader!(device, "shadow_depth"),
            cube_depth: shader!(device, "cube_depth"),
            lighting_hard_dir: shader!(device, "lighting_hard_dir"),
            lighting_hard_point: shader!(device, "lighting_hard_point"),
            lighting_hard_spot: shader!(device, "lighting_hard_spot"),
            lighting_pcss: shader!(device, "lighting_pcss"),
            lighting_vsm: shader!(device, "lighting_vsm"),
            lighting_vssm: shader!(device, "lighting_vssm"),
            lighting_esm: shader!(device, "lighting_esm"),
            lighting_msm: shader!(device, "lighting_msm"),
            depth_moments: shader!(device, "depth_moments"),
            sat: shader!(device, "sat"),
            esm_encode: shader!(device, "esm_encode"),
            gaussian_blur: shader!(device, "gaussian_blur"),
            msm_moments: shader!(device, "msm_moments"),
            rsm_gbuffer: shader!(device, "rsm_gbuffer"),
            rsm_lighting: shader!(device, "rsm_lighting"),
            rsm_lighting_pass2: shader!(device, "rsm_lighting_pass2"),
            voxelize: shader!(device, "voxelize"),
            voxel_mipmap: shader!(device, "voxel_mipmap"),
            cone_trace: shader!(device, "cone_trace"),
            voxel_debug: shader!(device, "voxel_debug"),
            tonemap: shader!(device, "tonemap"),
        }
    }
}
