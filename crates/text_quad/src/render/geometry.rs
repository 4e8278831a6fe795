//! Quad geometry
//!
//! Converts the shape's rectangle into four textured vertices and owns the
//! GPU buffers they live in. Vertices are in the shape's data space; the
//! texture canvas has a fixed size, so the quad can stretch independently of
//! the raster.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec2;

use super::binding::{BufferBinding, VertexArrayBinding};
use super::context::{BufferTarget, GraphicsContext, VertexAttribute};
use super::shader::{ShaderProgram, POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE};
use super::RenderResult;

/// Two triangles over the vertices of [`build_vertices`]
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Interleaved vertex: position followed by texture coordinate
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    /// Position in data space (z is always 0)
    pub position: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

const FLOAT_SIZE: u32 = std::mem::size_of::<f32>() as u32;
const STRIDE: u32 = std::mem::size_of::<QuadVertex>() as u32;

/// Build the quad for a rectangle
///
/// Vertices are ordered top-right, bottom-right, bottom-left, top-left with
/// texture coordinates `(1,1), (1,0), (0,0), (0,1)`, so the texture origin
/// lands on the rectangle's bottom-left corner.
pub fn build_vertices(position: Vec2, extent: Vec2) -> [QuadVertex; 4] {
    let (left, bottom) = (position.x, position.y);
    let (right, top) = (position.x + extent.x, position.y + extent.y);
    [
        QuadVertex {
            position: [right, top, 0.0],
            tex_coord: [1.0, 1.0],
        },
        QuadVertex {
            position: [right, bottom, 0.0],
            tex_coord: [1.0, 0.0],
        },
        QuadVertex {
            position: [left, bottom, 0.0],
            tex_coord: [0.0, 0.0],
        },
        QuadVertex {
            position: [left, top, 0.0],
            tex_coord: [0.0, 1.0],
        },
    ]
}

/// GPU-side quad: vertex array, vertex buffer and index buffer
#[derive(Debug)]
pub struct QuadMesh<C: GraphicsContext> {
    vertex_array: C::VertexArray,
    vertex_buffer: C::Buffer,
    index_buffer: C::Buffer,
    uploaded: (Vec2, Vec2),
}

impl<C: GraphicsContext> QuadMesh<C> {
    /// Create the buffers, upload the initial quad and describe its layout
    ///
    /// Attribute locations come from `shader` (`aPosition`, `aTexCoord`),
    /// defaulting to 0 and 1 when the program does not report them.
    pub fn new(
        ctx: &C,
        shader: &impl ShaderProgram,
        position: Vec2,
        extent: Vec2,
    ) -> RenderResult<Self> {
        let vertex_array = ctx.create_vertex_array()?;
        let vertex_buffer = match ctx.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.delete_vertex_array(vertex_array);
                return Err(e);
            }
        };
        let index_buffer = match ctx.create_buffer() {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.delete_buffer(vertex_buffer);
                ctx.delete_vertex_array(vertex_array);
                return Err(e);
            }
        };

        let mesh = Self {
            vertex_array,
            vertex_buffer,
            index_buffer,
            uploaded: (position, extent),
        };
        mesh.describe(ctx, shader);
        Ok(mesh)
    }

    fn describe(&self, ctx: &C, shader: &impl ShaderProgram) {
        let vertices = build_vertices(self.uploaded.0, self.uploaded.1);
        let position_location = attribute_location(shader, POSITION_ATTRIBUTE, 0);
        let tex_coord_location = attribute_location(shader, TEX_COORD_ATTRIBUTE, 1);

        let _vao = VertexArrayBinding::new(ctx, self.vertex_array);
        let vbo = BufferBinding::new(ctx, BufferTarget::Array, self.vertex_buffer);
        vbo.data(bytemuck::cast_slice(&vertices));

        // The element binding is vertex array state and leaves with it
        ctx.bind_buffer(BufferTarget::ElementArray, Some(self.index_buffer));
        ctx.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&QUAD_INDICES));

        ctx.vertex_attribute(VertexAttribute {
            location: position_location,
            components: 3,
            stride: STRIDE,
            offset: 0,
        });
        ctx.vertex_attribute(VertexAttribute {
            location: tex_coord_location,
            components: 2,
            stride: STRIDE,
            offset: 3 * FLOAT_SIZE,
        });
    }

    /// Re-upload vertex data if the rectangle moved or resized
    ///
    /// Returns whether an upload happened.
    pub fn sync(&mut self, ctx: &C, position: Vec2, extent: Vec2) -> bool {
        if self.uploaded == (position, extent) {
            return false;
        }
        let vertices = build_vertices(position, extent);
        let vbo = BufferBinding::new(ctx, BufferTarget::Array, self.vertex_buffer);
        vbo.data(bytemuck::cast_slice(&vertices));
        self.uploaded = (position, extent);
        true
    }

    /// Draw both triangles
    pub fn draw(&self, ctx: &C) {
        let _vao = VertexArrayBinding::new(ctx, self.vertex_array);
        ctx.draw_indexed_triangles(QUAD_INDICES.len() as u32);
    }

    /// Vertex array handle
    pub fn vertex_array(&self) -> C::VertexArray {
        self.vertex_array
    }

    /// Vertex buffer handle
    pub fn vertex_buffer(&self) -> C::Buffer {
        self.vertex_buffer
    }

    /// Index buffer handle
    pub fn index_buffer(&self) -> C::Buffer {
        self.index_buffer
    }

    /// Delete the vertex array and both buffers
    pub fn release(&self, ctx: &C) {
        ctx.delete_vertex_array(self.vertex_array);
        ctx.delete_buffer(self.vertex_buffer);
        ctx.delete_buffer(self.index_buffer);
    }
}

fn attribute_location(shader: &impl ShaderProgram, name: &str, fallback: u32) -> u32 {
    shader.attribute_location(name).unwrap_or_else(|| {
        log::warn!("Shader has no '{}' attribute, using location {}", name, fallback);
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GlCall, HeadlessContext, HeadlessShader};

    #[test]
    fn test_vertex_order_and_tex_coords() {
        let vertices = build_vertices(Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0));

        let positions: Vec<[f32; 2]> = vertices
            .iter()
            .map(|v| [v.position[0], v.position[1]])
            .collect();
        assert_eq!(positions, vec![[10.0, 20.0], [10.0, 0.0], [0.0, 0.0], [0.0, 20.0]]);

        let uvs: Vec<[f32; 2]> = vertices.iter().map(|v| v.tex_coord).collect();
        assert_eq!(uvs, vec![[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]]);
        assert!(vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_offset_rectangle() {
        let vertices = build_vertices(Vec2::new(0.25, 0.5), Vec2::new(0.5, 0.25));
        assert_eq!(vertices[0].position, [0.75, 0.75, 0.0]);
        assert_eq!(vertices[2].position, [0.25, 0.5, 0.0]);
    }

    #[test]
    fn test_vertex_is_five_floats() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), std::mem::size_of::<f32>() * 5);
    }

    #[test]
    fn test_mesh_layout() {
        let ctx = HeadlessContext::new();
        let shader = HeadlessShader::new();
        let mesh = QuadMesh::new(&ctx, &shader, Vec2::zeros(), Vec2::new(1.0, 1.0)).unwrap();

        assert_eq!(
            ctx.vertex_attributes(mesh.vertex_array()),
            vec![
                VertexAttribute {
                    location: 0,
                    components: 3,
                    stride: 20,
                    offset: 0,
                },
                VertexAttribute {
                    location: 1,
                    components: 2,
                    stride: 20,
                    offset: 12,
                },
            ]
        );
        assert_eq!(ctx.element_buffer_of(mesh.vertex_array()), Some(mesh.index_buffer()));

        let indices = ctx.buffer_contents(mesh.index_buffer()).unwrap();
        assert_eq!(indices, bytemuck::cast_slice::<u32, u8>(&QUAD_INDICES).to_vec());
        assert!(ctx.is_unbound());
        assert!(ctx.take_errors().is_empty());
    }

    #[test]
    fn test_custom_attribute_locations() {
        let ctx = HeadlessContext::new();
        let shader = HeadlessShader::with_locations([("aPosition", 4), ("aTexCoord", 7)]);
        let mesh = QuadMesh::new(&ctx, &shader, Vec2::zeros(), Vec2::new(1.0, 1.0)).unwrap();

        let locations: Vec<u32> = ctx
            .vertex_attributes(mesh.vertex_array())
            .iter()
            .map(|a| a.location)
            .collect();
        assert_eq!(locations, vec![4, 7]);
    }

    #[test]
    fn test_sync_only_uploads_changes() {
        let ctx = HeadlessContext::new();
        let shader = HeadlessShader::new();
        let mut mesh = QuadMesh::new(&ctx, &shader, Vec2::zeros(), Vec2::new(1.0, 1.0)).unwrap();

        ctx.clear_calls();
        assert!(!mesh.sync(&ctx, Vec2::zeros(), Vec2::new(1.0, 1.0)));
        assert!(ctx.calls().is_empty());

        assert!(mesh.sync(&ctx, Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0)));
        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindBuffer(BufferTarget::Array, Some(mesh.vertex_buffer())),
                GlCall::BufferData(BufferTarget::Array, 80),
                GlCall::BindBuffer(BufferTarget::Array, None),
            ]
        );

        let expected = build_vertices(Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0));
        let stored = ctx.buffer_contents(mesh.vertex_buffer()).unwrap();
        assert_eq!(stored, bytemuck::cast_slice::<QuadVertex, u8>(&expected).to_vec());
    }

    #[test]
    fn test_draw_uses_six_indices() {
        let ctx = HeadlessContext::new();
        let shader = HeadlessShader::new();
        let mesh = QuadMesh::new(&ctx, &shader, Vec2::zeros(), Vec2::new(1.0, 1.0)).unwrap();

        ctx.clear_calls();
        mesh.draw(&ctx);
        assert_eq!(
            ctx.calls(),
            vec![
                GlCall::BindVertexArray(Some(mesh.vertex_array())),
                GlCall::DrawIndexedTriangles {
                    index_count: 6,
                    texture: None,
                },
                GlCall::BindVertexArray(None),
            ]
        );
        assert!(ctx.take_errors().is_empty());
    }

    #[test]
    fn test_release_frees_everything() {
        let ctx = HeadlessContext::new();
        let shader = HeadlessShader::new();
        let mesh = QuadMesh::new(&ctx, &shader, Vec2::zeros(), Vec2::new(1.0, 1.0)).unwrap();
        mesh.release(&ctx);
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(ctx.live_vertex_arrays(), 0);
    }
}
