//! Mesh management module.
//!
//! The demo draws a single quad, so a mesh here is just a vertex buffer plus the layout needed
//! to point attributes into it. Vertices describe their layout through the [`Vertex`] trait.

use crate::abs::driver::{Driver, check};
use crate::error::SetupError;

/// Trait that defines the layout of a vertex.
pub trait Vertex {
    /// Number of `f32`s per vertex.
    const FLOATS: usize;

    /// Distance in bytes between two vertices.
    const STRIDE: i32 = (Self::FLOATS * std::mem::size_of::<f32>()) as i32;

    /// Sets up the attribute pointers for the currently bound buffer.
    fn vertex_attribs<D: Driver>(gl: &D, attribs: &Attribs);
}

/// Attribute locations resolved from the linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribs {
    pub position: u32,
    pub tex_coord: u32,
}

/// A vertex of the textured quad: a `vec4` position followed by a `vec2` texture coordinate.
pub struct QuadVertex;

impl Vertex for QuadVertex {
    const FLOATS: usize = 6;

    fn vertex_attribs<D: Driver>(gl: &D, attribs: &Attribs) {
        gl.vertex_attrib_pointer_f32(attribs.position, 4, false, Self::STRIDE, 0);
        gl.vertex_attrib_pointer_f32(
            attribs.tex_coord,
            2,
            false,
            Self::STRIDE,
            4 * std::mem::size_of::<f32>() as i32,
        );
    }
}

/// Full screen quad, drawn as a triangle fan. Texture coordinates flip v so the image's first
/// row ends up at the top of the screen.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 24] = [
    -1.0, -1.0, 0.0, 1.0,   0.0, 1.0,
     1.0, -1.0, 0.0, 1.0,   1.0, 1.0,
     1.0,  1.0, 0.0, 1.0,   1.0, 0.0,
    -1.0,  1.0, 0.0, 1.0,   0.0, 0.0,
];

/// Represents a vertex buffer stored on the GPU side.
pub struct Mesh<D: Driver> {
    vbo: D::Buffer,
    draw_mode: u32,
    vertex_count: i32,
}

impl<D: Driver> Mesh<D> {
    /// Uploads the vertex data once with `STATIC_DRAW`.
    pub fn new<V: Vertex>(gl: &D, vertices: &[f32], draw_mode: u32) -> Result<Self, SetupError> {
        let vbo = gl
            .create_buffer()
            .map_err(|reason| SetupError::CreateObject {
                object: "buffer",
                reason,
            })?;
        let bytes: Vec<u8> = vertices.iter().flat_map(|f| f.to_ne_bytes()).collect();

        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
        check(gl, "vertex upload");

        Ok(Self {
            vbo,
            draw_mode,
            vertex_count: (vertices.len() / V::FLOATS) as i32,
        })
    }

    /// Rebinds the buffer and respecifies the attribute pointers.
    pub fn bind<V: Vertex>(&self, gl: &D, attribs: &Attribs) {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        V::vertex_attribs(gl, attribs);
    }

    /// Draws every vertex in the buffer.
    pub fn draw(&self, gl: &D) {
        gl.draw_arrays(self.draw_mode, 0, self.vertex_count);
    }

    // Returns the amount of vertices in the mesh
    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::driver::mock::{Call, MockGl};

    #[test]
    fn test_quad_layout() {
        assert_eq!(QuadVertex::STRIDE, 24);
        assert_eq!(QUAD_VERTICES.len() / QuadVertex::FLOATS, 4);
    }

    #[test]
    fn test_quad_upload_and_bind() {
        let gl = MockGl::default();
        let mesh =
            Mesh::new::<QuadVertex>(&gl, &QUAD_VERTICES, glow::TRIANGLE_FAN).unwrap();
        assert_eq!(mesh.vertex_count(), 4);

        mesh.bind::<QuadVertex>(
            &gl,
            &Attribs {
                position: 3,
                tex_coord: 5,
            },
        );

        let calls = gl.calls.lock().unwrap();
        assert!(calls.contains(&Call::BufferData {
            target: glow::ARRAY_BUFFER,
            len: 96,
            usage: glow::STATIC_DRAW,
        }));
        assert!(calls.contains(&Call::AttribPointer {
            index: 3,
            size: 4,
            stride: 24,
            offset: 0,
        }));
        assert!(calls.contains(&Call::AttribPointer {
            index: 5,
            size: 2,
            stride: 24,
            offset: 16,
        }));
    }
}
