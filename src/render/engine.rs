use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use winit::window::Window;

use crate::gallery::config::GalleryConfig;
use crate::gallery::tiles::Tile;
use crate::layout::style::{ImageFilter, LayoutStyle};
use crate::render::instances::{InstanceBuffer, TileInstance};
use crate::render::mesh::build_tile_quad;
use crate::render::pipeline::{Globals, RenderState, TilePipeline};
use crate::render::scene::{place_tile, view_projection, SceneTransform};
use crate::render::texture::TextureLibrary;
use crate::ui::integration::EguiIntegration;
use crate::ui::style::apply_domefit_style;

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub window: Arc<Window>,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("request adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("domefit device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .expect("request device");

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
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            window,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// Contiguous run of instances sharing one image.
#[derive(Clone, Debug, PartialEq)]
pub struct TileBatch {
    pub src: String,
    pub instances: Range<u32>,
}

/// Group drawable tiles by image source. Tiles with an empty `src` are skipped.
/// Returns `(src, tile indices)` in source order, so batches are deterministic.
pub fn group_tiles_by_src(tiles: &[Tile]) -> Vec<(&str, Vec<usize>)> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, tile) in tiles.iter().enumerate() {
        if tile.image.is_empty() {
            continue;
        }
        groups.entry(tile.image.src.as_str()).or_default().push(i);
    }
    groups.into_iter().collect()
}

/// Owns all GPU rendering state: device, pipeline, textures, egui integration.
/// Created once on window open, used each frame for drawing.
pub struct RenderEngine {
    pub gpu: GpuState,
    pub render: RenderState,
    pub tile_pipeline: TilePipeline,
    pub tile_instances: InstanceBuffer<TileInstance>,
    pub textures: TextureLibrary,
    pub batches: Vec<TileBatch>,
    pub clear_color: wgpu::Color,
    pub egui: EguiIntegration,
}

impl RenderEngine {
    pub fn new(window: Arc<Window>) -> Self {
        let gpu = GpuState::new(window.clone());

        let (vertices, indices) = build_tile_quad();
        let render = RenderState::new(&gpu.device, gpu.config.width, gpu.config.height, &vertices, &indices);

        let textures = TextureLibrary::new(&gpu.device, &gpu.queue);
        let tile_pipeline = TilePipeline::new(&gpu.device, gpu.config.format, textures.layout());
        let tile_instances = InstanceBuffer::new(&gpu.device, "tile instances", 256);

        let egui = EguiIntegration::new(&gpu.device, gpu.config.format, window);
        apply_domefit_style(&egui.ctx);

        Self {
            gpu,
            render,
            tile_pipeline,
            tile_instances,
            textures,
            batches: Vec::new(),
            clear_color: wgpu::Color::WHITE,
            egui,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.render.resize_depth(&self.gpu.device, self.gpu.config.width, self.gpu.config.height);
    }

    /// Rebuild per-tile instances. Needed whenever the tiles or the radius change;
    /// rotation alone only touches the globals.
    pub fn rebuild_tiles(&mut self, tiles: &[Tile], segments: usize, radius_px: f64, config: &GalleryConfig) {
        self.tile_instances.clear();
        self.batches.clear();

        for (src, indices) in group_tiles_by_src(tiles) {
            let path = config.resolve_image_path(src);
            let loaded = self.textures.ensure(&self.gpu.device, &self.gpu.queue, src, path.as_deref());
            let start = self.tile_instances.count();
            for i in indices {
                let placement = place_tile(&tiles[i], segments, radius_px);
                if placement.width_px <= 0.0 || placement.height_px <= 0.0 {
                    continue;
                }
                self.tile_instances.push(TileInstance::new(
                    placement.model_matrix(radius_px),
                    placement.width_px as f32,
                    placement.height_px as f32,
                    !loaded,
                ));
            }
            let end = self.tile_instances.count();
            if end > start {
                self.batches.push(TileBatch {
                    src: src.to_string(),
                    instances: start..end,
                });
            }
        }

        self.tile_instances.upload(&self.gpu.device, &self.gpu.queue);
        log::debug!("{} tile instances in {} batches", self.tile_instances.len(), self.batches.len());
    }

    /// Upload the per-frame globals: camera, sphere transform and styling.
    pub fn update_globals(&mut self, transform: &SceneTransform, style: &LayoutStyle) {
        let scale = self.scale_factor();
        let logical_w = (self.width() / scale) as f64;
        let logical_h = (self.height() / scale) as f64;
        let view_proj = view_projection(logical_w, logical_h, style.radius_px);

        // The surface is sRGB, so the overlay is handed to the GPU in linear space.
        let [r, g, b] = style.overlay_color.map(|c| c.powf(2.2));
        let grayscale = if style.image_filter == ImageFilter::Grayscale { 1.0 } else { 0.0 };
        let globals = Globals {
            view_proj: view_proj.to_cols_array_2d(),
            scene: transform.matrix().to_cols_array_2d(),
            overlay: [r, g, b, grayscale],
            params: [
                style.tile_radius_px,
                style.padding_px as f32 * scale,
                self.width(),
                self.height(),
            ],
        };
        self.tile_pipeline.upload_globals(&self.gpu.queue, &globals);

        self.clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };
    }

    /// Execute the tile render pass and the egui render pass, then submit.
    /// `egui_output` should be the result of `egui.end_frame()`.
    pub fn draw_and_submit(
        &mut self,
        egui_output: &egui::FullOutput,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.scale_factor(),
        };

        let mut encoder = self.gpu.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            },
        );

        let paint_jobs = self.egui.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &screen,
            egui_output,
        );

        // Main render pass: one instanced draw per image
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("dome pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.render.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !self.batches.is_empty() {
                pass.set_pipeline(&self.tile_pipeline.pipeline);
                pass.set_bind_group(0, &self.tile_pipeline.globals_bind_group, &[]);
                pass.set_vertex_buffer(0, self.render.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.tile_instances.slice());
                pass.set_index_buffer(
                    self.render.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                for batch in &self.batches {
                    pass.set_bind_group(1, self.textures.bind_group(&batch.src), &[]);
                    pass.draw_indexed(0..self.render.num_indices, 0, batch.instances.clone());
                }
            }
        }

        // Egui render pass
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui.renderer.render(&mut pass, &paint_jobs, &screen);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.egui.cleanup(egui_output);
        Ok(output)
    }

    pub fn width(&self) -> f32 {
        self.gpu.config.width as f32
    }

    pub fn height(&self) -> f32 {
        self.gpu.config.height as f32
    }

    pub fn scale_factor(&self) -> f32 {
        self.gpu.window.scale_factor() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::tiles::{build_tiles, ImageRef};

    #[test]
    fn test_grouping_skips_empty_sources() {
        let tiles = build_tiles(&[], 3);
        assert_eq!(tiles.len(), 15);
        assert!(group_tiles_by_src(&tiles).is_empty());
    }

    #[test]
    fn test_grouping_covers_every_tile_once() {
        let pool = vec![ImageRef::from("b"), ImageRef::from("a"), ImageRef::from("c")];
        let tiles = build_tiles(&pool, 4);
        let groups = group_tiles_by_src(&tiles);

        let srcs: Vec<&str> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(srcs, vec!["a", "b", "c"]);

        let mut all: Vec<usize> = groups.iter().flat_map(|(_, ix)| ix.iter().copied()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..tiles.len()).collect::<Vec<_>>());
        for (src, indices) in &groups {
            assert!(indices.iter().all(|&i| tiles[i].image.src == *src));
        }
    }
}
