use crate::camera::PerspectiveCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use canvasfit_common::BufferSize;
use glam::{EulerRot, Mat4};
use wgpu::util::DeviceExt;

/// Cube color, `#44aa88`, as sRGB bytes.
pub const CUBE_COLOR: [u8; 3] = [0x44, 0xaa, 0x88];

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
}

/// Unit cube corners and counter-clockwise, outward-facing triangles.
fn cube_mesh() -> ([Vertex; 8], [u16; 36]) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = [
        Vertex { position: [-p, -p, -p] },
        Vertex { position: [ p, -p, -p] },
        Vertex { position: [ p,  p, -p] },
        Vertex { position: [-p,  p, -p] },
        Vertex { position: [-p, -p,  p] },
        Vertex { position: [ p, -p,  p] },
        Vertex { position: [ p,  p,  p] },
        Vertex { position: [-p,  p,  p] },
    ];
    #[rustfmt::skip]
    let indices = [
        4, 5, 6, 6, 7, 4, // +Z
        1, 0, 3, 3, 2, 1, // -Z
        5, 1, 2, 2, 6, 5, // +X
        0, 4, 7, 7, 3, 0, // -X
        7, 6, 2, 2, 3, 7, // +Y
        0, 1, 5, 5, 4, 0, // -Y
    ];
    (vertices, indices)
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = f32::from(c) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Color to write so the cube shows as `CUBE_COLOR` on screen.
///
/// sRGB targets encode on write, so they get linear values.
fn cube_color(format: wgpu::TextureFormat) -> [f32; 4] {
    let [r, g, b] = CUBE_COLOR;
    if format.is_srgb() {
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), 1.0]
    } else {
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        ]
    }
}

/// Cube orientation at `time` seconds: `x = t`, `y = 1.1 t`.
pub(crate) fn model_matrix(time: f32) -> Mat4 {
    Mat4::from_euler(EulerRot::XYZ, time, time * 1.1, 0.0)
}

/// Largest usable MSAA sample count not above `requested`.
///
/// Falls back to 1 when the adapter cannot multisample `format` at the
/// requested count.
pub fn supported_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    requested: u32,
) -> u32 {
    if requested <= 1 {
        return 1;
    }
    let color = adapter.get_texture_format_features(format).flags;
    let depth = adapter.get_texture_format_features(DEPTH_FORMAT).flags;
    if color.sample_count_supported(requested) && depth.sample_count_supported(requested) {
        requested
    } else {
        tracing::warn!(requested, ?format, "MSAA sample count unsupported, rendering without MSAA");
        1
    }
}

/// wgpu renderer for a single rotating cube.
pub struct CubeRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    size: BufferSize,
    sample_count: u32,
    surface_format: wgpu::TextureFormat,
    color: [f32; 4],
}

impl CubeRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: BufferSize,
        sample_count: u32,
    ) -> Self {
        let sample_count = sample_count.max(1);
        let color = cube_color(surface_format);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_uniforms"),
            contents: bytemuck::bytes_of(&Uniforms {
                mvp: Mat4::IDENTITY.to_cols_array_2d(),
                color,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube_bind_group_layout"),
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
            label: Some("cube_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
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
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let (vertices, indices) = cube_mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let depth_view = Self::create_attachment(device, DEPTH_FORMAT, size, sample_count);
        let msaa_view = (sample_count > 1)
            .then(|| Self::create_attachment(device, surface_format, size, sample_count));

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            depth_view,
            msaa_view,
            size,
            sample_count,
            surface_format,
            color,
        }
    }

    /// Match the attachments to a new buffer size. Returns whether anything
    /// was recreated.
    pub fn resize(&mut self, device: &wgpu::Device, size: BufferSize) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.depth_view = Self::create_attachment(device, DEPTH_FORMAT, size, self.sample_count);
        if self.sample_count > 1 {
            self.msaa_view = Some(Self::create_attachment(
                device,
                self.surface_format,
                size,
                self.sample_count,
            ));
        }
        true
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Render one frame with the cube rotated to `time` seconds.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &PerspectiveCamera,
        time: f32,
    ) {
        let mvp = camera.view_projection() * model_matrix(time);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                mvp: mvp.to_cols_array_2d(),
                color: self.color,
            }),
        );

        let (color_view, resolve_target, store) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(view), wgpu::StoreOp::Discard),
            None => (view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cube_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_attachment(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: BufferSize,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube_attachment"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_triangles_face_outward() {
        let (vertices, indices) = cube_mesh();
        let pos = |i: u16| Vec3::from(vertices[i as usize].position);
        for tri in indices.chunks(3) {
            let (a, b, c) = (pos(tri[0]), pos(tri[1]), pos(tri[2]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn cube_color_for_srgb_target_is_linear() {
        let linear = cube_color(wgpu::TextureFormat::Bgra8UnormSrgb);
        let plain = cube_color(wgpu::TextureFormat::Bgra8Unorm);
        assert!((plain[0] - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert!(linear[0] < plain[0]);
        assert_eq!(linear[3], 1.0);
    }

    #[test]
    fn rotation_starts_at_identity() {
        assert!(model_matrix(0.0).abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(!model_matrix(1.0).abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }
}
