//! GPU instance buffer types for instanced tile rendering.
//!
//! Each struct is `#[repr(C)]` + `bytemuck::Pod` and provides a
//! `desc()` returning `VertexBufferLayout` with `step_mode: Instance`.
//! Shader locations start at 2, after the per-vertex position and uv.

use std::marker::PhantomData;

/// Per-tile instance data: the tile's sphere-local model matrix plus what the
/// fragment stage needs to round its corners.
///
/// 80 bytes (20 floats). Shader locations 2–7.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileInstance {
    /// Column-major model matrix (see `TilePlacement::model_matrix`).
    pub model: [[f32; 4]; 4],
    /// Image width and height in pixels.
    pub size_px: [f32; 2],
    /// 1.0 when the image failed to load and a placeholder is drawn instead.
    pub placeholder: f32,
    pub _pad: f32,
}

impl TileInstance {
    pub fn new(model: glam::Mat4, width_px: f32, height_px: f32, placeholder: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            size_px: [width_px, height_px],
            placeholder: if placeholder { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // model columns
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 32,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 48,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // size_px
                wgpu::VertexAttribute {
                    offset: 64,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // placeholder
                wgpu::VertexAttribute {
                    offset: 72,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// CPU-side staging for a growable GPU instance buffer.
///
/// Instances are pushed each rebuild, then `upload` copies them to the GPU,
/// reallocating (doubling) when the buffer is too small.
pub struct InstanceBuffer<T: bytemuck::Pod> {
    buffer: wgpu::Buffer,
    capacity: usize,
    data: Vec<T>,
    label: &'static str,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> InstanceBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Self::allocate(device, label, capacity),
            capacity,
            data: Vec::with_capacity(capacity),
            label,
            _marker: PhantomData,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<T>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn push(&mut self, instance: T) {
        self.data.push(instance);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn count(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.data.is_empty() {
            return;
        }
        if self.data.len() > self.capacity {
            self.capacity = self.data.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("{}: grew to {} instances", self.label, self.capacity);
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.data));
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        let used = (self.data.len().max(1) * std::mem::size_of::<T>()) as u64;
        self.buffer.slice(..used)
    }
}
