//! Vello-based renderer and GPU snapshot rasterizer.

use crate::renderer::{DrawCommand, RenderContext, RenderResult, Renderer, RendererError};
use crate::snapshot::{RasterImage, Rasterizer};
use kurbo::{Affine, Rect};
use peniko::{Color, Fill};
use vello::{AaConfig, RenderParams, RendererOptions, Scene};

/// Builds Vello scenes from board render passes.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Paint one command. Live commands get a drop shadow and a soft halo
    /// standing in for the blur.
    fn render_command(&mut self, command: &DrawCommand, transform: Affine) {
        if let Some(effects) = command.effects {
            let shadow = effects.shadow;
            let mut shadow_style = command.style.clone();
            shadow_style.width += shadow.radius;
            self.scene.stroke(
                &shadow_style,
                transform * Affine::translate(shadow.offset),
                shadow.color.multiply_alpha(0.5),
                None,
                &command.path,
            );

            let mut halo_style = command.style.clone();
            halo_style.width += effects.blur_radius * 2.0;
            self.scene.stroke(
                &halo_style,
                transform,
                command.color.multiply_alpha(0.35),
                None,
                &command.path,
            );
        }

        self.scene
            .stroke(&command.style, transform, command.color, None, &command.path);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();

        let (width, height) = ctx.pixel_size();
        let background = Rect::new(0.0, 0.0, width as f64, height as f64);
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            self.background_color(ctx),
            None,
            &background,
        );

        let transform = Affine::scale(ctx.scale_factor);
        for command in ctx.commands() {
            self.render_command(&command, transform);
        }
    }
}

/// Offscreen GPU rasterizer for snapshots.
pub struct VelloRasterizer {
    render_cx: vello::util::RenderContext,
    dev_id: usize,
    renderer: vello::Renderer,
    scene_builder: VelloRenderer,
}

impl VelloRasterizer {
    /// Acquire a GPU device. Fails with `RenderingUnavailable` when no adapter exists.
    pub fn new() -> RenderResult<Self> {
        let mut render_cx = vello::util::RenderContext::new();
        let dev_id = pollster::block_on(render_cx.device(None)).ok_or_else(|| {
            RendererError::RenderingUnavailable("no compatible GPU adapter".to_string())
        })?;

        let renderer = vello::Renderer::new(
            &render_cx.devices[dev_id].device,
            RendererOptions::default(),
        )
        .map_err(|e| RendererError::RenderingUnavailable(format!("{e:?}")))?;

        log::info!("Vello snapshot rasterizer ready");
        Ok(Self {
            render_cx,
            dev_id,
            renderer,
            scene_builder: VelloRenderer::new(),
        })
    }
}

impl Rasterizer for VelloRasterizer {
    fn rasterize(&mut self, ctx: &RenderContext) -> RenderResult<RasterImage> {
        let (width, height) = ctx.pixel_size();
        if width == 0 || height == 0 {
            return Err(RendererError::RenderingUnavailable(
                "zero-sized target".to_string(),
            ));
        }

        self.scene_builder.build_scene(ctx);
        let scene = self.scene_builder.take_scene();

        let handle = &self.render_cx.devices[self.dev_id];
        let device = &handle.device;
        let queue = &handle.queue;

        // Create offscreen texture for rendering
        let texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("snapshot texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        let params = RenderParams {
            base_color: ctx.background_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };
        self.renderer
            .render_to_texture(device, queue, &scene, &texture_view, &params)
            .map_err(|e| RendererError::RenderFailed(format!("{e:?}")))?;

        let bytes_per_row = (width * 4).next_multiple_of(256); // wgpu alignment requirement
        let buffer_size = (bytes_per_row * height) as u64;
        let readback_buffer = device.create_buffer(&vello::wgpu::BufferDescriptor {
            label: Some("snapshot readback buffer"),
            size: buffer_size,
            usage: vello::wgpu::BufferUsages::COPY_DST | vello::wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("snapshot copy encoder"),
        });
        encoder.copy_texture_to_buffer(
            vello::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: vello::wgpu::Origin3d::ZERO,
                aspect: vello::wgpu::TextureAspect::All,
            },
            vello::wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: vello::wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(vello::wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        let _ = device.poll(vello::wgpu::PollType::wait_indefinitely());

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RendererError::RenderFailed(format!("readback: {e:?}"))),
            Err(e) => return Err(RendererError::RenderFailed(format!("readback: {e}"))),
        }

        let data = buffer_slice.get_mapped_range();
        // Remove row padding
        let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let row_start = (row * bytes_per_row) as usize;
            let row_end = row_start + (width * 4) as usize;
            rgba_data.extend_from_slice(&data[row_start..row_end]);
        }
        drop(data);
        readback_buffer.unmap();

        Ok(RasterImage {
            rgba_data,
            width,
            height,
        })
    }
}
