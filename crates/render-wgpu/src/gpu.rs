use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use hakoview_render::{FLOOR_HEIGHT, Instance, RenderView, Scene, Shape, ShapeKind};
use std::collections::BTreeMap;
use std::ops::Range;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    to_light: [f32; 4],
    ambient: [f32; 4],
    key_color: [f32; 4],
}

impl Uniforms {
    fn new(view: &RenderView, scene: &Scene) -> Self {
        let lights = &scene.lights;
        let to_light = -lights.key_direction();
        let [ar, ag, ab] = lights.ambient;
        let [kr, kg, kb] = lights.key_color;
        Self {
            view_proj: view.view_projection().as_mat4().to_cols_array_2d(),
            to_light: [
                to_light.x,
                to_light.y,
                to_light.z,
                if lights.is_enabled() { 1.0 } else { 0.0 },
            ],
            ambient: [ar, ag, ab, 1.0],
            key_color: [kr, kg, kb, 1.0],
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
    color: [f32; 4],
}

impl From<&Instance> for InstanceData {
    fn from(instance: &Instance) -> Self {
        let [model_0, model_1, model_2, model_3] = instance.model.to_cols_array_2d();
        Self {
            model_0,
            model_1,
            model_2,
            model_3,
            color: instance.color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, kind: ShapeKind) -> Self {
        let mesh = Shape::unit(kind).mesh();
        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|v| Vertex {
                position: v.position,
                normal: v.normal,
            })
            .collect();
        let label = format!("{kind:?}").to_lowercase();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Floor grid lines on the XY plane, just above the floor plane.
/// The lines through the origin are tinted to mark the X and Y axes.
fn grid_mesh(half_extent: i32, spacing: f32, height: f32) -> Vec<GridVertex> {
    let mut verts = Vec::new();
    let color = [0.35, 0.35, 0.35, 1.0];
    let x_axis = [0.7, 0.25, 0.25, 1.0];
    let y_axis = [0.25, 0.7, 0.25, 1.0];
    let extent = half_extent as f32 * spacing;

    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        let (along_x, along_y) = if i == 0 { (x_axis, y_axis) } else { (color, color) };
        verts.push(GridVertex {
            position: [-extent, offset, height],
            color: along_x,
        });
        verts.push(GridVertex {
            position: [extent, offset, height],
            color: along_x,
        });
        verts.push(GridVertex {
            position: [offset, -extent, height],
            color: along_y,
        });
        verts.push(GridVertex {
            position: [offset, extent, height],
            color: along_y,
        });
    }
    verts
}

/// Packs instances grouped by shape kind and returns the instance range of
/// each group. At most `max` instances are kept.
fn batch_instances(
    instances: &[Instance],
    max: usize,
) -> (Vec<InstanceData>, Vec<(ShapeKind, Range<u32>)>) {
    let mut data = Vec::with_capacity(instances.len().min(max));
    let mut ranges = Vec::new();
    for kind in ShapeKind::ALL {
        let start = data.len() as u32;
        for instance in instances.iter().filter(|i| i.kind == kind) {
            if data.len() >= max {
                break;
            }
            data.push(InstanceData::from(instance));
        }
        let end = data.len() as u32;
        if end > start {
            ranges.push((kind, start..end));
        }
    }
    (data, ranges)
}

/// wgpu renderer for the visualizer scene.
pub struct WgpuRenderer {
    shape_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<ShapeKind, GpuMesh>,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                to_light: [0.0, 0.0, 1.0, 0.0],
                ambient: [1.0; 4],
                key_color: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shape_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHAPE_SHADER.into()),
        });

        let shape_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shape_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shape_shader,
                entry_point: Some("vs_shape"),
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
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shape_shader,
                entry_point: Some("fs_shape"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Planes are single-sided; the floor and rotors stay visible from below.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
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

        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::GRID_SHADER.into()),
        });

        let grid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &grid_shader,
                entry_point: Some("vs_grid"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GridVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &grid_shader,
                entry_point: Some("fs_grid"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let meshes = ShapeKind::ALL
            .into_iter()
            .map(|kind| (kind, GpuMesh::upload(device, kind)))
            .collect();

        let grid_verts = grid_mesh(20, 0.5, FLOOR_HEIGHT + 0.002);
        let grid_vertex_count = grid_verts.len() as u32;
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let max_instances = 256u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);
        tracing::debug!(?surface_format, width, height, "wgpu renderer created");

        Self {
            shape_pipeline,
            grid_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes,
            grid_vertex_buffer,
            grid_vertex_count,
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: floor grid, then every scene instance.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(view, scene)),
        );

        let instances = scene.instances();
        let (data, batches) = batch_instances(&instances, self.max_instances as usize);
        if data.len() < instances.len() {
            tracing::warn!(
                dropped = instances.len() - data.len(),
                "instance buffer full"
            );
        }
        if !data.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&data));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.12,
                            g: 0.13,
                            b: 0.16,
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

            pass.set_pipeline(&self.grid_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            pass.draw(0..self.grid_vertex_count, 0..1);

            if !batches.is_empty() {
                pass.set_pipeline(&self.shape_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for (kind, range) in batches {
                    let Some(mesh) = self.meshes.get(&kind) else {
                        continue;
                    };
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..mesh.index_count, 0, range);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_lies_at_requested_height() {
        let verts = grid_mesh(4, 0.5, -0.3);
        assert_eq!(verts.len(), 9 * 4);
        assert!(verts.iter().all(|v| v.position[2] == -0.3));
        let max = verts
            .iter()
            .map(|v| v.position[0].abs().max(v.position[1].abs()))
            .fold(0.0_f32, f32::max);
        assert_eq!(max, 2.0);
    }

    #[test]
    fn batches_group_by_kind() {
        let scene = Scene::default();
        let instances = scene.instances();
        let (data, batches) = batch_instances(&instances, 256);

        assert_eq!(data.len(), instances.len());
        let covered: u32 = batches.iter().map(|(_, r)| r.end - r.start).sum();
        assert_eq!(covered as usize, instances.len());
        for (kind, range) in &batches {
            let expected = instances.iter().filter(|i| i.kind == *kind).count();
            assert_eq!((range.end - range.start) as usize, expected);
        }
    }

    #[test]
    fn batching_respects_capacity() {
        let scene = Scene::default();
        let instances = scene.instances();
        let (data, batches) = batch_instances(&instances, 2);
        assert_eq!(data.len(), 2);
        assert!(batches.iter().all(|(_, r)| r.end <= 2));
    }

    #[test]
    fn lighting_flag_follows_rig() {
        let mut scene = Scene::default();
        let view = RenderView::default();
        assert_eq!(Uniforms::new(&view, &scene).to_light[3], 1.0);
        scene.lights.toggle(false);
        assert_eq!(Uniforms::new(&view, &scene).to_light[3], 0.0);
    }
}
