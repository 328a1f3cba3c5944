use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::ops::Range;
use tileworld_assets::{TextureImage, TextureStore};
use tileworld_common::TextureHandle;
use tileworld_render::{BlendMode, DrawCommand, GridMesh, Vertex};
use wgpu::util::DeviceExt;

/// Billboard vertices the streaming buffer holds per frame.
const MAX_BILLBOARD_VERTICES: usize = 6 * 4096;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    world: [[f32; 4]; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            world: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PassOp {
    Terrain {
        blend: BlendMode,
        texture: TextureHandle,
        indices: Range<u32>,
    },
    Billboard {
        blend: BlendMode,
        texture: TextureHandle,
        vertices: Range<u32>,
    },
}

/// A frame plan lowered to what a single render pass needs.
#[derive(Debug, Default)]
struct CompiledFrame {
    clear: Option<[f32; 4]>,
    uniforms: Uniforms,
    billboard_vertices: Vec<Vertex>,
    ops: Vec<PassOp>,
}

fn to_world_space(world: Mat4, local: &[Vertex; 6]) -> [Vertex; 6] {
    local.map(|v| {
        let p = world.transform_point3(v.position.into());
        let n = world.transform_vector3(v.normal.into()).normalize_or_zero();
        Vertex::new(p.to_array(), n.to_array(), v.uv)
    })
}

/// Lower a plan into pass operations, keeping plan order.
///
/// Uniforms are written once per submission, so the last `SetTransforms`
/// wins. Billboards are moved into world space here and share one vertex
/// upload.
fn compile(plan: &[DrawCommand], texture_count: usize) -> CompiledFrame {
    let mut frame = CompiledFrame::default();
    let mut blend = BlendMode::Opaque;
    let mut dropped = 0usize;

    for command in plan {
        match command {
            DrawCommand::Clear { color } => frame.clear = Some(*color),
            DrawCommand::SetBlend(mode) => blend = *mode,
            DrawCommand::SetTransforms {
                world,
                view,
                projection,
            } => {
                frame.uniforms = Uniforms {
                    view_proj: (*projection * *view).to_cols_array_2d(),
                    world: world.to_cols_array_2d(),
                };
            }
            DrawCommand::DrawCell {
                cell,
                texture,
                first_index,
                index_count,
            } => {
                if texture.0 as usize >= texture_count {
                    tracing::warn!(
                        x = cell.x,
                        z = cell.z,
                        texture = texture.0,
                        "unknown texture handle"
                    );
                    continue;
                }
                frame.ops.push(PassOp::Terrain {
                    blend,
                    texture: *texture,
                    indices: *first_index..first_index + index_count,
                });
            }
            DrawCommand::DrawBillboard {
                kind,
                texture,
                world,
                vertices,
            } => {
                if texture.0 as usize >= texture_count {
                    tracing::warn!(?kind, texture = texture.0, "unknown texture handle");
                    continue;
                }
                if frame.billboard_vertices.len() + vertices.len() > MAX_BILLBOARD_VERTICES {
                    dropped += 1;
                    continue;
                }
                let start = frame.billboard_vertices.len() as u32;
                frame
                    .billboard_vertices
                    .extend_from_slice(&to_world_space(*world, vertices));
                frame.ops.push(PassOp::Billboard {
                    blend,
                    texture: *texture,
                    vertices: start..start + vertices.len() as u32,
                });
            }
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "billboard buffer full, skipping draws");
    }
    frame
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Opaque => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

/// One pipeline per blend mode for a given vertex entry point.
struct PipelinePair {
    opaque: wgpu::RenderPipeline,
    alpha: wgpu::RenderPipeline,
}

impl PipelinePair {
    fn get(&self, mode: BlendMode) -> &wgpu::RenderPipeline {
        match mode {
            BlendMode::Opaque => &self.opaque,
            BlendMode::Alpha => &self.alpha,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
    entry_point: &str,
    cull_mode: Option<wgpu::Face>,
    format: wgpu::TextureFormat,
    blend: BlendMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            buffers: &[vertex_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // Cell triangles wind clockwise seen from above.
            front_face: wgpu::FrontFace::Cw,
            cull_mode,
            ..Default::default()
        },
        // Painter's order; no depth attachment.
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    name: &str,
    image: &TextureImage,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(name),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );
    let view = texture.create_view(&Default::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(name),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Executes frame plans on a wgpu device.
///
/// Terrain vertex and index buffers are uploaded once at construction and
/// each cell is drawn from its own index range. Billboards stream through a
/// fixed-size vertex buffer rewritten every frame.
pub struct WgpuRenderer {
    terrain: PipelinePair,
    billboard: PipelinePair,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    terrain_vertex_buffer: wgpu::Buffer,
    terrain_index_buffer: wgpu::Buffer,
    billboard_vertex_buffer: wgpu::Buffer,
    textures: Vec<wgpu::BindGroup>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        mesh: &GridMesh,
        store: &TextureStore,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
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
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
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

        // Pixel-art textures: nearest filtering, clamped edges.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let textures = store
            .iter()
            .map(|(handle, image)| {
                let name = store.name(handle).unwrap_or("texture");
                upload_texture(device, queue, &texture_layout, &sampler, name, image)
            })
            .collect::<Vec<_>>();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("textured_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::TEXTURED_SHADER.into()),
        });

        let pair = |label: &str, entry: &str, cull: Option<wgpu::Face>| PipelinePair {
            opaque: create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                label,
                entry,
                cull,
                surface_format,
                BlendMode::Opaque,
            ),
            alpha: create_pipeline(
                device,
                &pipeline_layout,
                &shader,
                label,
                entry,
                cull,
                surface_format,
                BlendMode::Alpha,
            ),
        };
        let terrain = pair("terrain_pipeline", "vs_terrain", Some(wgpu::Face::Back));
        let billboard = pair("billboard_pipeline", "vs_billboard", None);

        let terrain_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_vertex_buffer"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let terrain_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let billboard_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("billboard_vertex_buffer"),
            size: (MAX_BILLBOARD_VERTICES * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::info!(
            cells = mesh.width() as u64 * mesh.height() as u64,
            textures = textures.len(),
            "wgpu renderer ready"
        );

        Self {
            terrain,
            billboard,
            uniform_buffer,
            uniform_bind_group,
            terrain_vertex_buffer,
            terrain_index_buffer,
            billboard_vertex_buffer,
            textures,
        }
    }

    /// Execute one frame plan into `view`.
    ///
    /// Commands run in plan order. Draws naming an unknown texture are
    /// skipped with a warning. Without a `Clear` the target is loaded as is.
    pub fn execute(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        plan: &[DrawCommand],
    ) {
        let frame = compile(plan, self.textures.len());

        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.uniforms));
        if !frame.billboard_vertices.is_empty() {
            queue.write_buffer(
                &self.billboard_vertex_buffer,
                0,
                bytemuck::cast_slice(&frame.billboard_vertices),
            );
        }

        let load = match frame.clear {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            for op in &frame.ops {
                match op {
                    PassOp::Terrain {
                        blend,
                        texture,
                        indices,
                    } => {
                        pass.set_pipeline(self.terrain.get(*blend));
                        pass.set_bind_group(1, &self.textures[texture.0 as usize], &[]);
                        pass.set_vertex_buffer(0, self.terrain_vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            self.terrain_index_buffer.slice(..),
                            wgpu::IndexFormat::Uint16,
                        );
                        pass.draw_indexed(indices.clone(), 0, 0..1);
                    }
                    PassOp::Billboard {
                        blend,
                        texture,
                        vertices,
                    } => {
                        pass.set_pipeline(self.billboard.get(*blend));
                        pass.set_bind_group(1, &self.textures[texture.0 as usize], &[]);
                        pass.set_vertex_buffer(0, self.billboard_vertex_buffer.slice(..));
                        pass.draw(vertices.clone(), 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tileworld_common::{GridCoord, ItemKind};

    fn quad() -> [Vertex; 6] {
        let v = |x: f32, y: f32| Vertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, 1.0 - y]);
        [v(-0.5, 0.0), v(0.5, 0.0), v(0.5, 1.0), v(-0.5, 0.0), v(0.5, 1.0), v(-0.5, 1.0)]
    }

    fn cell(x: u32, texture: u32) -> DrawCommand {
        DrawCommand::DrawCell {
            cell: GridCoord::new(x, 0),
            texture: TextureHandle(texture),
            first_index: x * 6,
            index_count: 6,
        }
    }

    fn billboard(texture: u32, at: Vec3) -> DrawCommand {
        DrawCommand::DrawBillboard {
            kind: ItemKind::Tree,
            texture: TextureHandle(texture),
            world: Mat4::from_translation(at),
            vertices: quad(),
        }
    }

    #[test]
    fn compile_keeps_plan_order_and_blend() {
        let plan = vec![
            DrawCommand::Clear {
                color: [0.1, 0.2, 0.3, 1.0],
            },
            cell(0, 0),
            DrawCommand::SetBlend(BlendMode::Alpha),
            cell(1, 1),
            billboard(2, Vec3::ZERO),
        ];
        let frame = compile(&plan, 3);
        assert_eq!(frame.clear, Some([0.1, 0.2, 0.3, 1.0]));
        assert_eq!(
            frame.ops,
            vec![
                PassOp::Terrain {
                    blend: BlendMode::Opaque,
                    texture: TextureHandle(0),
                    indices: 0..6,
                },
                PassOp::Terrain {
                    blend: BlendMode::Alpha,
                    texture: TextureHandle(1),
                    indices: 6..12,
                },
                PassOp::Billboard {
                    blend: BlendMode::Alpha,
                    texture: TextureHandle(2),
                    vertices: 0..6,
                },
            ]
        );
    }

    #[test]
    fn compile_without_clear_loads() {
        let frame = compile(&[cell(0, 0)], 1);
        assert_eq!(frame.clear, None);
        assert_eq!(frame.uniforms, Uniforms::default());
    }

    #[test]
    fn unknown_texture_is_skipped() {
        let plan = vec![cell(0, 5), billboard(9, Vec3::ZERO), cell(1, 0)];
        let frame = compile(&plan, 1);
        assert_eq!(frame.ops.len(), 1);
        assert!(frame.billboard_vertices.is_empty());
    }

    #[test]
    fn billboards_are_moved_to_world_space() {
        let plan = vec![
            billboard(0, Vec3::new(2.5, 0.0, 3.5)),
            billboard(0, Vec3::new(7.5, 0.0, 1.5)),
        ];
        let frame = compile(&plan, 1);
        assert_eq!(frame.billboard_vertices.len(), 12);
        assert_eq!(frame.billboard_vertices[0].position, [2.0, 0.0, 3.5]);
        assert_eq!(frame.billboard_vertices[6].position, [7.0, 0.0, 1.5]);
        assert_eq!(frame.billboard_vertices[2].uv, quad()[2].uv);
        match &frame.ops[1] {
            PassOp::Billboard { vertices, .. } => assert_eq!(*vertices, 6..12),
            other => panic!("expected billboard, got {other:?}"),
        }
    }

    #[test]
    fn last_transforms_win() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let projection = Mat4::from_scale(Vec3::splat(2.0));
        let plan = vec![
            DrawCommand::SetTransforms {
                world: Mat4::IDENTITY,
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
            },
            DrawCommand::SetTransforms {
                world: Mat4::IDENTITY,
                view,
                projection,
            },
        ];
        let frame = compile(&plan, 0);
        assert_eq!(frame.uniforms.view_proj, (projection * view).to_cols_array_2d());
    }

    #[test]
    fn billboard_overflow_is_dropped() {
        let count = MAX_BILLBOARD_VERTICES / 6 + 3;
        let plan = (0..count)
            .map(|i| billboard(0, Vec3::new(i as f32, 0.0, 0.0)))
            .collect::<Vec<_>>();
        let frame = compile(&plan, 1);
        assert_eq!(frame.billboard_vertices.len(), MAX_BILLBOARD_VERTICES);
        assert_eq!(frame.ops.len(), MAX_BILLBOARD_VERTICES / 6);
    }

    #[test]
    fn uniforms_are_two_matrices() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 128);
    }
}
