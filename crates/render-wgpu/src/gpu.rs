use crate::camera::OrbitCamera;
use crate::error::RenderError;
use crate::shaders;
use blockfield_layout::InstanceLayout;
use blockfield_render::displacement::{HIGH_COLOR, LOW_COLOR, VERTICAL_SCALE};
use blockfield_render::{HeightTexture, HemisphereLight, Scene, TextureBridge, TextureId};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Edge length of one block.
pub const BLOCK_SIZE: f32 = 0.1;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    low_color: [f32; 4],
    high_color: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    params: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, light: &HemisphereLight) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            low_color: LOW_COLOR.extend(1.0).to_array(),
            high_color: HIGH_COLOR.extend(1.0).to_array(),
            sky_color: light.sky_color.extend(1.0).to_array(),
            ground_color: light.ground_color.extend(1.0).to_array(),
            params: [VERTICAL_SCALE, light.intensity, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceUv {
    uv: [f32; 2],
}

/// Generate block vertices and indices for a cube of edge `size`.
fn block_mesh(size: f32) -> (Vec<Vertex>, Vec<u16>) {
    let p = size * 0.5;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Pick an sRGB format if the surface offers one, otherwise its first format.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Result<wgpu::TextureFormat, RenderError> {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or(formats.first())
        .copied()
        .ok_or(RenderError::NoSurfaceFormat)
}

/// Per-instance vertex data: base matrices and UVs, index-aligned with the layout.
fn instance_buffers(layout: &InstanceLayout) -> (Vec<InstanceData>, Vec<InstanceUv>) {
    let matrices = layout
        .transforms()
        .iter()
        .map(|t| {
            let cols = t.to_matrix().to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
            }
        })
        .collect();
    let uvs = layout
        .uvs()
        .iter()
        .map(|uv| InstanceUv { uv: uv.to_array() })
        .collect();
    (matrices, uvs)
}

/// GPU mirror of the most recently uploaded height texture.
struct GpuHeightTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    source: TextureId,
    width: u32,
    height: u32,
}

/// wgpu-based block field renderer.
pub struct WgpuRenderer {
    block_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    height_bind_group_layout: wgpu::BindGroupLayout,
    height_sampler: wgpu::Sampler,
    block_vertex_buffer: wgpu::Buffer,
    block_index_buffer: wgpu::Buffer,
    block_index_count: u32,
    instance_buffer: wgpu::Buffer,
    uv_buffer: wgpu::Buffer,
    instance_count: u32,
    height: Option<GpuHeightTexture>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// Build the pipeline and upload the static instance layout.
    ///
    /// Shader or pipeline validation errors are returned, never swallowed.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        layout: &InstanceLayout,
    ) -> Result<Self, RenderError> {
        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(
                Mat4::IDENTITY,
                &HemisphereLight::default(),
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Height map is sampled in the vertex stage
        let height_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("height_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let height_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("height_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &height_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Block pipeline
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let block_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("block_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLOCK_SHADER.into()),
        });

        let block_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("block_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &block_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceUv>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![6 => Float32x2],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &block_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilation {
                label: "block_pipeline",
                message: err.to_string(),
            });
        }

        // Block mesh
        let (block_verts, block_indices) = block_mesh(BLOCK_SIZE);
        let block_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("block_vertex_buffer"),
            contents: bytemuck::cast_slice(&block_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let block_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("block_index_buffer"),
            contents: bytemuck::cast_slice(&block_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let block_index_count = block_indices.len() as u32;

        // Static instance layers, uploaded once
        let (instances, uvs) = instance_buffers(layout);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uv_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance_uv_buffer"),
            contents: bytemuck::cast_slice(&uvs),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_count = instances.len() as u32;

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(instance_count, "block renderer ready");

        Ok(Self {
            block_pipeline,
            uniform_buffer,
            uniform_bind_group,
            height_bind_group_layout,
            height_sampler,
            block_vertex_buffer,
            block_index_buffer,
            block_index_count,
            instance_buffer,
            uv_buffer,
            instance_count,
            height: None,
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Texture id currently mirrored on the GPU.
    pub fn uploaded_texture(&self) -> Option<TextureId> {
        self.height.as_ref().map(|h| h.source)
    }

    /// Upload the bridge's texture if it is dirty. Returns true if anything
    /// was written.
    ///
    /// A same-sized texture is overwritten in place so the bind group stays
    /// valid; a size change replaces both texture and bind group.
    pub fn sync_height_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bridge: &mut TextureBridge,
    ) -> bool {
        let Some(texture) = bridge.take_dirty() else {
            return false;
        };

        let reuse = self
            .height
            .as_ref()
            .is_some_and(|h| h.width == texture.width() && h.height == texture.height());
        if !reuse {
            self.height = Some(self.create_height_texture(device, &texture));
        }
        if let Some(gpu) = &mut self.height {
            write_height_texels(queue, &gpu.texture, &texture);
            gpu.source = texture.id();
        }

        tracing::debug!(
            id = texture.id().0,
            recreated = !reuse,
            "height texture uploaded"
        );
        true
    }

    /// Render one frame. Returns the number of draw calls issued.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &Scene,
    ) -> u32 {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(camera.view_projection(), &scene.light)),
        );

        // Blocks only draw when the scene has them and the GPU holds the
        // texture the scene is bound to.
        let blocks = match (scene.height_instances(), &self.height) {
            (Some(node), Some(gpu)) if gpu.source == node.texture => {
                Some((&gpu.bind_group, node.instance_count.min(self.instance_count)))
            }
            (Some(node), _) => {
                tracing::debug!(
                    texture = node.texture.0,
                    "height texture not uploaded, skipping blocks"
                );
                None
            }
            (None, _) => None,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some((height_bind_group, count)) = blocks {
                pass.set_pipeline(&self.block_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, height_bind_group, &[]);
                pass.set_vertex_buffer(0, self.block_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_vertex_buffer(2, self.uv_buffer.slice(..));
                pass.set_index_buffer(
                    self.block_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..self.block_index_count, 0, 0..count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        u32::from(blocks.is_some())
    }

    fn create_height_texture(
        &self,
        device: &wgpu::Device,
        source: &HeightTexture,
    ) -> GpuHeightTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("height_texture"),
            size: height_extent(source),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("height_bind_group"),
            layout: &self.height_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.height_sampler),
                },
            ],
        });
        GpuHeightTexture {
            texture,
            bind_group,
            source: source.id(),
            width: source.width(),
            height: source.height(),
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn height_extent(source: &HeightTexture) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: source.width(),
        height: source.height(),
        depth_or_array_layers: 1,
    }
}

fn write_height_texels(queue: &wgpu::Queue, texture: &wgpu::Texture, source: &HeightTexture) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        source.texels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(source.bytes_per_row()),
            rows_per_image: Some(source.height()),
        },
        height_extent(source),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfield_common::SessionRng;
    use blockfield_layout::{PlaneParams, ReferenceMesh};

    #[test]
    fn block_mesh_has_six_faces() {
        let (verts, indices) = block_mesh(BLOCK_SIZE);
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        for v in &verts {
            for c in v.position {
                assert!((c.abs() - 0.05).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn instance_buffers_align_with_layout() {
        let mesh = ReferenceMesh::plane(PlaneParams::default());
        let layout = InstanceLayout::build(&mesh, &mut SessionRng::from_seed_u64(1));
        let (matrices, uvs) = instance_buffers(&layout);
        assert_eq!(matrices.len(), layout.len());
        assert_eq!(uvs.len(), layout.len());
        for i in [0, 1, 5000, layout.len() - 1] {
            let p = layout.transforms()[i].position;
            assert_eq!(matrices[i].model_3, [p.x, p.y, p.z, 1.0]);
            assert_eq!(uvs[i].uv, layout.uvs()[i].to_array());
        }
    }

    #[test]
    fn uniforms_carry_shared_constants() {
        let u = Uniforms::new(Mat4::IDENTITY, &HemisphereLight::default());
        assert_eq!(u.low_color, [1.0, 0.125, 0.0, 1.0]);
        assert_eq!(u.high_color, [0.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.params[0], 5.0);
        assert_eq!(u.params[1], 1.0);
    }

    #[test]
    fn surface_format_prefers_srgb() {
        use wgpu::TextureFormat::{Bgra8Unorm, Bgra8UnormSrgb, Rgba16Float};
        assert_eq!(
            choose_surface_format(&[Bgra8Unorm, Bgra8UnormSrgb]).unwrap(),
            Bgra8UnormSrgb
        );
        assert_eq!(choose_surface_format(&[Rgba16Float, Bgra8Unorm]).unwrap(), Rgba16Float);
    }

    #[test]
    fn empty_surface_format_list_is_its_own_error() {
        assert!(matches!(
            choose_surface_format(&[]),
            Err(RenderError::NoSurfaceFormat)
        ));
    }

    #[test]
    fn uniform_block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
