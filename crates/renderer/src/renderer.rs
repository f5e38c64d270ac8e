//! Thin render adapter: a single instanced pipeline draws every sphere-shaped
//! body (ships, bullets, planetoids, ring particles); a second pipeline draws
//! camera-facing billboards for explosions. The core never depends on `wgpu`
//! directly — it only ever talks to the [`RenderAdapter`] trait.

use std::sync::Arc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use std::path::Path;

use crate::camera::{Camera, CameraUniform};
use crate::mesh::Mesh;
use crate::texture::Texture;
use crate::vertex::{InstanceData, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const BODY_SHADER: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};
@group(0) @binding(0) var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * model * vec4<f32>(vertex.position, 1.0);
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.4, 0.8, 0.3));
    let lit = max(dot(in.world_normal, light_dir), 0.0) * 0.7 + 0.3;
    return vec4<f32>(in.color.rgb * lit, in.color.a);
}
"#;

const BILLBOARD_SHADER: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};
@group(0) @binding(0) var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let center = model * vec4<f32>(0.0, 0.0, 0.0, 1.0);
    let scale_x = length(model[0].xyz);
    let scale_y = length(model[1].xyz);

    // Face the camera by rebuilding the quad from the camera's right/up, ignoring
    // the instance's own rotation (billboards never need orientation).
    let cam_right = normalize(vec3<f32>(camera.view_proj[0][0], camera.view_proj[1][0], camera.view_proj[2][0]));
    let cam_up = normalize(vec3<f32>(camera.view_proj[0][1], camera.view_proj[1][1], camera.view_proj[2][1]));
    let offset = cam_right * vertex.position.x * scale_x + cam_up * vertex.position.y * scale_y;

    var out: VertexOutput;
    out.clip_position = camera.view_proj * (center + vec4<f32>(offset, 0.0));
    out.tex_coords = vertex.tex_coords;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d = distance(in.tex_coords, vec2<f32>(0.5, 0.5));
    let alpha = smoothstep(0.5, 0.3, d);
    return vec4<f32>(in.color.rgb, in.color.a * alpha);
}
"#;

/// One instanced draw call: a mesh plus the per-instance transforms/colors to draw it with.
pub struct DrawBatch {
    pub mesh_handle: MeshHandle,
    pub instances: Vec<InstanceData>,
}

/// Opaque handle to a mesh uploaded into the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(pub u32);

/// Opaque handle to a texture atlas uploaded into the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasHandle(pub u32);

/// The narrow contract the simulation core draws through; it never sees `wgpu`
/// types. Implemented by [`Renderer`].
pub trait RenderAdapter {
    /// Load (or look up a cached) sphere mesh for body rendering. Every body shares
    /// one of a small number of tessellation levels, distinguished by `segments`.
    fn sphere_mesh(&mut self, segments: u32, rings: u32) -> MeshHandle;
    /// The shared explosion billboard quad.
    fn billboard_mesh(&mut self) -> MeshHandle;
    /// Load a model file's first mesh primitive, returning an opaque handle.
    fn load_model(&mut self, path: &Path) -> Result<MeshHandle>;
    /// Load an image file as an explosion-billboard atlas, returning an opaque handle.
    fn load_atlas(&mut self, path: &Path) -> Result<AtlasHandle>;
    /// Submit one frame: body instances drawn lit, billboard instances drawn
    /// additively facing the camera.
    fn draw_frame(&mut self, camera: &Camera, bodies: &[DrawBatch], billboards: &[DrawBatch]) -> Result<()>;
    fn resize(&mut self, width: u32, height: u32);
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    body_pipeline: wgpu::RenderPipeline,
    billboard_pipeline: wgpu::RenderPipeline,
    camera_bind_group_layout: wgpu::BindGroupLayout,
    camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_uniform: CameraUniform,
    depth_view: wgpu::TextureView,

    meshes: Vec<Mesh>,
    sphere_handle_by_tessellation: Vec<(u32, u32, MeshHandle)>,
    billboard_handle: Option<MeshHandle>,
    atlases: Vec<Texture>,
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader_source: &str,
    format: wgpu::TextureFormat,
    label: &str,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[Vertex::layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: blend.is_none(),
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("failed to find suitable GPU adapter"))?;

        log::info!("using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Body Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let body_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            BODY_SHADER,
            config.format,
            "Body Pipeline",
            None,
        );

        let billboard_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            BILLBOARD_SHADER,
            config.format,
            "Billboard Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            body_pipeline,
            billboard_pipeline,
            camera_bind_group_layout,
            camera_bind_group,
            camera_buffer,
            camera_uniform,
            depth_view,
            meshes: Vec::new(),
            sphere_handle_by_tessellation: Vec::new(),
            billboard_handle: None,
            atlases: Vec::new(),
        })
    }

    fn upload_instances(&self, instances: &[InstanceData]) -> Option<wgpu::Buffer> {
        if instances.is_empty() {
            return None;
        }
        Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        }))
    }
}

impl RenderAdapter for Renderer {
    fn sphere_mesh(&mut self, segments: u32, rings: u32) -> MeshHandle {
        if let Some((_, _, handle)) = self
            .sphere_handle_by_tessellation
            .iter()
            .find(|(s, r, _)| *s == segments && *r == rings)
        {
            return *handle;
        }
        let mesh = Mesh::sphere(&self.device, 1.0, segments, rings);
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        self.sphere_handle_by_tessellation.push((segments, rings, handle));
        handle
    }

    fn billboard_mesh(&mut self) -> MeshHandle {
        if let Some(handle) = self.billboard_handle {
            return handle;
        }
        let mesh = Mesh::billboard_quad(&self.device, 1.0);
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        self.billboard_handle = Some(handle);
        handle
    }

    fn load_model(&mut self, path: &Path) -> Result<MeshHandle> {
        let mesh = crate::model::load_first_primitive(&self.device, path)?;
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        Ok(handle)
    }

    fn load_atlas(&mut self, path: &Path) -> Result<AtlasHandle> {
        let texture = Texture::from_path(&self.device, &self.queue, path)?;
        let handle = AtlasHandle(self.atlases.len() as u32);
        self.atlases.push(texture);
        Ok(handle)
    }

    fn draw_frame(&mut self, camera: &Camera, bodies: &[DrawBatch], billboards: &[DrawBatch]) -> Result<()> {
        self.camera_uniform.update(camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let instance_buffers: Vec<(MeshHandle, Option<wgpu::Buffer>, u32)> = bodies
            .iter()
            .chain(billboards.iter())
            .map(|batch| {
                let count = batch.instances.len() as u32;
                (batch.mesh_handle, self.upload_instances(&batch.instances), count)
            })
            .collect();

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.01, g: 0.01, b: 0.03, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            pass.set_pipeline(&self.body_pipeline);
            for (handle, buffer, count) in instance_buffers.iter().take(bodies.len()) {
                let Some(buffer) = buffer else { continue };
                let mesh = &self.meshes[handle.0 as usize];
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.num_indices, 0, 0..*count);
            }

            pass.set_pipeline(&self.billboard_pipeline);
            for (handle, buffer, count) in instance_buffers.iter().skip(bodies.len()) {
                let Some(buffer) = buffer else { continue };
                let mesh = &self.meshes[handle.0 as usize];
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.num_indices, 0, 0..*count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = winit::dpi::PhysicalSize::new(width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }
}
