use std::collections::HashMap;

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::gpu::DEPTH_FORMAT;
use super::textures;
use crate::context::SceneContext;
use crate::scene::{LightKind, MeshId, NodeKind, Primitive, Shading, Side, TextureId};

const MAX_LIGHTS: usize = 4;
/// Per-draw uniforms are packed at the minimum dynamic-offset alignment
const DRAW_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniform {
    direction: [f32; 4],
    radiance: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    counts: [u32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
    params: [f32; 4],
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    skinned: bool,
}

struct DrawItem {
    key: (MeshId, usize),
    texture: Option<TextureId>,
    side: Side,
    slot: u32,
}

/// Depth-tested forward pass over every visible mesh primitive
pub struct MeshPass {
    pipelines: [wgpu::RenderPipeline; 3],
    frame_buffer: wgpu::Buffer,
    frame_layout: wgpu::BindGroupLayout,
    frame_bind_group: wgpu::BindGroup,
    env_sampler: wgpu::Sampler,
    has_environment: bool,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: u64,
    texture_layout: wgpu::BindGroupLayout,
    texture_sampler: wgpu::Sampler,
    white_bind_group: wgpu::BindGroup,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    primitives: HashMap<(MeshId, usize), GpuPrimitive>,
    items: Vec<DrawItem>,
}

impl MeshPass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipelines = [Side::Front, Side::Back, Side::Double].map(|side| {
            Self::create_pipeline(device, &pipeline_layout, &shader, color_format, side)
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let env_sampler = textures::create_sampler(device, "Environment Sampler", wgpu::AddressMode::ClampToEdge);
        let placeholder = textures::placeholder_cube(device, queue);
        let frame_bind_group =
            Self::create_frame_bind_group(device, &frame_layout, &frame_buffer, &placeholder, &env_sampler);

        let draw_capacity = 64;
        let (draw_buffer, draw_bind_group) = Self::create_draw_buffer(device, &draw_layout, draw_capacity);

        let texture_sampler = textures::create_sampler(device, "Material Sampler", wgpu::AddressMode::Repeat);
        let white = textures::white(device, queue);
        let white_bind_group = Self::create_texture_bind_group(device, &texture_layout, &white, &texture_sampler);

        Self {
            pipelines,
            frame_buffer,
            frame_layout,
            frame_bind_group,
            env_sampler,
            has_environment: false,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity,
            texture_layout,
            texture_sampler,
            white_bind_group,
            textures: HashMap::new(),
            primitives: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        color_format: wgpu::TextureFormat,
        side: Side,
    ) -> wgpu::RenderPipeline {
        let cull_mode = match side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_frame_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        environment: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(environment),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: capacity * DRAW_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Binds the environment cube for standard materials
    pub fn set_environment(&mut self, device: &wgpu::Device, environment: &wgpu::TextureView) {
        self.frame_bind_group = Self::create_frame_bind_group(
            device,
            &self.frame_layout,
            &self.frame_buffer,
            environment,
            &self.env_sampler,
        );
        self.has_environment = true;
    }

    /// Uploads anything new, refreshes skinned vertices and writes this
    /// frame's uniforms
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &SceneContext) {
        let graph = &scene.graph;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.frame_uniform(scene)));

        self.items.clear();
        let mut draws: Vec<DrawUniform> = Vec::new();

        for (_, node) in graph.nodes() {
            let NodeKind::Mesh(mesh_id) = node.kind else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = node.world_matrix();
            let normals = normal_matrix(&world);

            for (index, primitive) in graph.mesh(mesh_id).primitives.iter().enumerate() {
                if primitive.geometry.indices.is_empty() {
                    continue;
                }
                let key = (mesh_id, index);
                match self.primitives.get(&key) {
                    Some(gpu) if gpu.skinned => {
                        queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&vertices(primitive)));
                    }
                    Some(_) => {}
                    None => {
                        log::debug!("Uploading mesh {:?} primitive {}", mesh_id, index);
                        self.primitives.insert(key, upload_primitive(device, primitive));
                    }
                }

                let material = graph.material(primitive.material);
                if let Some(texture) = material.base_color_texture {
                    if !self.textures.contains_key(&texture) {
                        let bind_group = match graph.textures.get(texture.index()).and_then(|data| {
                            textures::upload_rgba(device, queue, "Material Texture", data)
                        }) {
                            Some(view) => Self::create_texture_bind_group(
                                device,
                                &self.texture_layout,
                                &view,
                                &self.texture_sampler,
                            ),
                            None => self.white_bind_group.clone(),
                        };
                        self.textures.insert(texture, bind_group);
                    }
                }

                let lit = material.shading == Shading::Standard;
                draws.push(DrawUniform {
                    model: world.to_cols_array_2d(),
                    normal_matrix: normals.to_cols_array_2d(),
                    base_color: material.base_color,
                    params: [
                        material.env_map_intensity,
                        if lit { 1.0 } else { 0.0 },
                        if material.supports_env_map() { 1.0 } else { 0.0 },
                        0.0,
                    ],
                });
                self.items.push(DrawItem {
                    key,
                    texture: material.base_color_texture,
                    side: material.side,
                    slot: (draws.len() - 1) as u32,
                });
            }
        }

        if draws.len() as u64 > self.draw_capacity {
            self.draw_capacity = (draws.len() as u64).next_power_of_two();
            let (buffer, bind_group) = Self::create_draw_buffer(device, &self.draw_layout, self.draw_capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
        }

        let mut bytes = vec![0u8; draws.len() * DRAW_STRIDE as usize];
        for (i, draw) in draws.iter().enumerate() {
            let start = i * DRAW_STRIDE as usize;
            let data = bytemuck::bytes_of(draw);
            bytes[start..start + data.len()].copy_from_slice(data);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for item in &self.items {
            let Some(gpu) = self.primitives.get(&item.key) else {
                continue;
            };
            let pipeline = match item.side {
                Side::Front => &self.pipelines[0],
                Side::Back => &self.pipelines[1],
                Side::Double => &self.pipelines[2],
            };
            let texture = item
                .texture
                .and_then(|t| self.textures.get(&t))
                .unwrap_or(&self.white_bind_group);

            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &self.draw_bind_group, &[item.slot * DRAW_STRIDE as u32]);
            pass.set_bind_group(2, texture, &[]);
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }
    }

    fn frame_uniform(&self, scene: &SceneContext) -> FrameUniform {
        let mut ambient = glam::Vec3::ZERO;
        let mut lights = [LightUniform::default(); MAX_LIGHTS];
        let mut count = 0;

        for (light, world) in scene.graph.lights() {
            match light.kind {
                LightKind::Ambient => ambient += light.radiance(),
                LightKind::Directional => {
                    let Some(direction) = light.direction(&world) else {
                        continue;
                    };
                    if count < MAX_LIGHTS {
                        lights[count] = LightUniform {
                            direction: direction.extend(0.0).to_array(),
                            radiance: light.radiance().extend(0.0).to_array(),
                        };
                        count += 1;
                    }
                }
            }
        }

        let has_environment = self.has_environment && scene.skybox().is_some();
        FrameUniform {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            camera_position: scene.camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            counts: [count as u32, has_environment as u32, 0, 0],
            lights,
        }
    }
}

fn vertices(primitive: &Primitive) -> Vec<Vertex> {
    let positions = primitive.positions();
    let normals = primitive.normals();
    let uvs = &primitive.geometry.uvs;

    positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: normals.get(i).map(|n| n.to_array()).unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

fn upload_primitive(device: &wgpu::Device, primitive: &Primitive) -> GpuPrimitive {
    let skinned = primitive.geometry.is_skinned();
    let mut usage = wgpu::BufferUsages::VERTEX;
    if skinned {
        usage |= wgpu::BufferUsages::COPY_DST;
    }

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices(primitive)),
        usage,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Index Buffer"),
        contents: bytemuck::cast_slice(&primitive.geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuPrimitive {
        vertex_buffer,
        index_buffer,
        index_count: primitive.geometry.indices.len() as u32,
        skinned,
    }
}

/// Inverse-transpose for normals; falls back to identity for singular matrices
fn normal_matrix(world: &Mat4) -> Mat4 {
    if world.determinant().abs() < f32::EPSILON {
        Mat4::IDENTITY
    } else {
        world.inverse().transpose()
    }
}
