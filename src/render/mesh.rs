/// 20-byte vertex: position (12), uv (8).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Unit quad centred on the origin in the XY plane, facing +Z.
///
/// Wound counter-clockwise seen from +Z so back-face culling hides tiles on
/// the far side of the dome. `uv` runs top-left (0,0) to bottom-right (1,1)
/// so images appear upright.
pub fn build_tile_quad() -> (Vec<Vertex>, Vec<u16>) {
    let verts = vec![
        Vertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
        Vertex { position: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
        Vertex { position: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
        Vertex { position: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (verts, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn test_quad_winding_faces_positive_z() {
        let (verts, indices) = build_tile_quad();
        for tri in indices.chunks(3) {
            let p = |i: u16| glam::Vec3::from(verts[i as usize].position);
            let normal = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(normal.z > 0.0, "triangle {tri:?} faces away");
        }
    }

    #[test]
    fn test_quad_uv_is_upright() {
        let (verts, _) = build_tile_quad();
        let top_left = verts.iter().find(|v| v.position[0] < 0.0 && v.position[1] > 0.0).expect("corner");
        assert_eq!(top_left.uv, [0.0, 0.0]);
    }
}
