use std::borrow::Cow;

use glam::{Mat4, Vec2};
use log::{debug, info};
use wgpu;
use wgpu::util::DeviceExt;

use crate::engine::graphics::{canvas::Canvas, vertex::Vertex};
use crate::error::{GameError, Result};

/// Where the logical screen lands inside the window: top-left offset and
/// uniform scale, both in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub offset: Vec2,
    pub scale: f32,
}

impl Letterbox {
    pub fn fit(physical: Vec2, logical: Vec2) -> Self {
        let scale = (physical.x / logical.x).min(physical.y / logical.y).max(f32::EPSILON);
        let offset = (physical - logical * scale) * 0.5;
        Self { offset, scale }
    }

    /// Physical window position to logical screen position.
    pub fn to_logical(&self, physical: Vec2) -> Vec2 {
        (physical - self.offset) / self.scale
    }
}

pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub render_pipeline: wgpu::RenderPipeline,
    pub projection_buffer: wgpu::Buffer,
    pub projection_bind_group: wgpu::BindGroup,
    logical_size: Vec2,
}

impl Renderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
        logical_size: Vec2,
        vsync: bool,
    ) -> Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = Self::pick_format(&surface_caps.formats)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(GameError::SurfaceCapabilities("alpha modes"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!("Surface configured: {:?} {}x{} ({:?})", surface_format, config.width, config.height, present_mode);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("../shaders/shape.wgsl"))),
        });

        let projection_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Projection Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(64),
                },
                count: None,
            }],
        });

        let projection = Self::projection(logical_size);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Projection Buffer"),
            contents: bytemuck::cast_slice(&[projection]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Projection Bind Group"),
            layout: &projection_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&projection_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Shapes are authored with either winding.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(Self {
            device,
            queue,
            config,
            render_pipeline,
            projection_buffer,
            projection_bind_group,
            logical_size,
        })
    }

    /// Colours are authored as plain bytes, so a linear target wins over sRGB.
    pub fn pick_format(formats: &[wgpu::TextureFormat]) -> Result<wgpu::TextureFormat> {
        formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| formats.first().copied())
            .ok_or(GameError::SurfaceCapabilities("formats"))
    }

    /// Maps logical pixels (origin top-left, y down) to clip space.
    pub fn projection(logical_size: Vec2) -> [[f32; 4]; 4] {
        Mat4::orthographic_rh(0.0, logical_size.x, logical_size.y, 0.0, -1.0, 1.0).to_cols_array_2d()
    }

    pub fn letterbox(&self) -> Letterbox {
        Letterbox::fit(
            Vec2::new(self.config.width as f32, self.config.height as f32),
            self.logical_size,
        )
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, surface: &wgpu::Surface) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            surface.configure(&self.device, &self.config);
            debug!("Surface resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&self, surface: &wgpu::Surface) {
        surface.configure(&self.device, &self.config);
    }

    pub fn render(&self, surface: &wgpu::Surface, canvas: &Canvas) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let vertices: Vec<Vertex> = canvas.vertices().copied().collect();
        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Canvas Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let letterbox = self.letterbox();
        let background = canvas.clear_color();

        {
            let backdrop = Self::backdrop(self.logical_size, background.to_array());
            let backdrop_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Backdrop Vertex Buffer"),
                contents: bytemuck::cast_slice(&backdrop),
                usage: wgpu::BufferUsages::VERTEX,
            });

            // Outside the letterboxed area stays black.
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_viewport(
                letterbox.offset.x,
                letterbox.offset.y,
                self.logical_size.x * letterbox.scale,
                self.logical_size.y * letterbox.scale,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.projection_bind_group, &[]);

            render_pass.set_vertex_buffer(0, backdrop_buffer.slice(..));
            render_pass.draw(0..backdrop.len() as u32, 0..1);

            if let Some(buffer) = &vertex_buffer {
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn backdrop(size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
        let corner = |x: f32, y: f32| Vertex { position: [x, y], color };
        [
            corner(0.0, 0.0),
            corner(size.x, 0.0),
            corner(size.x, size.y),
            corner(size.x, size.y),
            corner(0.0, size.y),
            corner(0.0, 0.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_fits_wide_window() {
        let lb = Letterbox::fit(Vec2::new(2560.0, 960.0), Vec2::new(1280.0, 960.0));
        assert_eq!(lb.scale, 1.0);
        assert_eq!(lb.offset, Vec2::new(640.0, 0.0));
        assert_eq!(lb.to_logical(Vec2::new(640.0, 10.0)), Vec2::new(0.0, 10.0));
    }

    #[test]
    fn letterbox_scales_down() {
        let lb = Letterbox::fit(Vec2::new(640.0, 480.0), Vec2::new(1280.0, 960.0));
        assert_eq!(lb.scale, 0.5);
        assert_eq!(lb.to_logical(Vec2::new(320.0, 240.0)), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn projection_maps_corners() {
        let m = Mat4::from_cols_array_2d(&Renderer::projection(Vec2::new(1280.0, 960.0)));
        let tl = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let br = m.project_point3(glam::Vec3::new(1280.0, 960.0, 0.0));
        assert!((tl.x + 1.0).abs() < 1e-5 && (tl.y - 1.0).abs() < 1e-5);
        assert!((br.x - 1.0).abs() < 1e-5 && (br.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn format_prefers_linear() {
        let formats = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm];
        assert_eq!(Renderer::pick_format(&formats).unwrap(), wgpu::TextureFormat::Bgra8Unorm);

        let srgb_only = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(Renderer::pick_format(&srgb_only).unwrap(), wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn no_formats_is_an_error() {
        let err = Renderer::pick_format(&[]).unwrap_err();
        assert!(matches!(err, GameError::SurfaceCapabilities("formats")));
    }
}
