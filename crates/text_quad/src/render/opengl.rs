//! OpenGL backend built on `glow`
//!
//! Requires an OpenGL 3.3 core (or GLES 3.0) context that is current on the
//! calling thread for as long as the [`GlowContext`] lives.

use std::fs;
use std::rc::Rc;

use glow::HasContext;

use crate::foundation::math::{to_column_major, Mat4};
use crate::text::PixelFormat;

use super::context::{BufferTarget, GraphicsContext, VertexAttribute};
use super::shader::{ShaderConfig, ShaderProgram};
use super::{RenderError, RenderResult};

/// [`GraphicsContext`] backed by a live OpenGL context
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    /// Wrap an existing `glow` context
    ///
    /// # Safety
    ///
    /// The context behind `gl` must stay current on this thread while the
    /// returned value, and anything created from it, is in use.
    pub unsafe fn new(gl: glow::Context) -> Self {
        log::info!(
            "OpenGL context: {} ({})",
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::RENDERER)
        );
        Self { gl }
    }

    /// Load the OpenGL function pointers through `loader`
    ///
    /// # Safety
    ///
    /// Same contract as [`GlowContext::new`]; `loader` must return pointers
    /// for the context that is current.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::ffi::c_void,
    {
        Self::new(glow::Context::from_loader_function(loader))
    }

    /// Raw `glow` context for calls outside the text pipeline
    pub const fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Clear the color buffer
    pub fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    /// Set the viewport to cover a framebuffer of the given size
    pub fn set_viewport(&self, width: i32, height: i32) {
        unsafe { self.gl.viewport(0, 0, width, height) };
    }
}

impl std::fmt::Debug for GlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowContext").finish_non_exhaustive()
    }
}

const fn gl_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

const fn gl_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::Bgra => glow::BGRA,
    }
}

impl GraphicsContext for GlowContext {
    type Texture = <glow::Context as HasContext>::Texture;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;

    fn create_texture(&self) -> RenderResult<Self::Texture> {
        unsafe { self.gl.create_texture() }.map_err(RenderError::ResourceCreationFailed)
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) };
    }

    fn bind_texture(&self, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) };
    }

    fn allocate_texture_storage(&self, width: u32, height: u32) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                None,
            );
        }
    }

    fn upload_texture_pixels(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        unsafe {
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                width as i32,
                height as i32,
                gl_format(format),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(pixels),
            );
        }
    }

    fn set_linear_filtering(&self) {
        unsafe {
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }

    fn enable_alpha_blending(&self) {
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    fn create_vertex_array(&self) -> RenderResult<Self::VertexArray> {
        unsafe { self.gl.create_vertex_array() }.map_err(RenderError::ResourceCreationFailed)
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) };
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) };
    }

    fn create_buffer(&self) -> RenderResult<Self::Buffer> {
        unsafe { self.gl.create_buffer() }.map_err(RenderError::ResourceCreationFailed)
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(gl_target(target), buffer) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(gl_target(target), data, glow::STATIC_DRAW);
        }
    }

    fn vertex_attribute(&self, attribute: VertexAttribute) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components as i32,
                glow::FLOAT,
                false,
                attribute.stride as i32,
                attribute.offset as i32,
            );
            self.gl.enable_vertex_attrib_array(attribute.location);
        }
    }

    fn draw_indexed_triangles(&self, index_count: u32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
        }
    }
}

/// Linked GLSL program
pub struct GlowShader {
    ctx: Rc<GlowContext>,
    program: <glow::Context as HasContext>::Program,
}

impl GlowShader {
    /// Compile and link a program from GLSL sources
    pub fn from_sources(
        ctx: Rc<GlowContext>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        let gl = ctx.gl();
        let program = unsafe {
            let program = gl
                .create_program()
                .map_err(RenderError::ResourceCreationFailed)?;

            let mut shaders = Vec::with_capacity(2);
            for (stage, source) in [
                (glow::VERTEX_SHADER, vertex_source),
                (glow::FRAGMENT_SHADER, fragment_source),
            ] {
                match compile_stage(gl, stage, source) {
                    Ok(shader) => {
                        gl.attach_shader(program, shader);
                        shaders.push(shader);
                    }
                    Err(e) => {
                        for shader in shaders {
                            gl.delete_shader(shader);
                        }
                        gl.delete_program(program);
                        return Err(e);
                    }
                }
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }
            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(RenderError::ShaderCompilation(format!("link failed: {log}")));
            }
            program
        };

        log::info!("Linked shader program {:?}", program);
        Ok(Self { ctx, program })
    }

    /// Read, compile and link the sources named by `config`
    pub fn from_files(ctx: Rc<GlowContext>, config: &ShaderConfig) -> RenderResult<Self> {
        let read = |path: &str| {
            fs::read_to_string(path).map_err(|e| {
                RenderError::BackendError(format!("failed to read shader '{path}': {e}"))
            })
        };
        let vertex_source = read(&config.vertex_shader_path)?;
        let fragment_source = read(&config.fragment_shader_path)?;
        Self::from_sources(ctx, &vertex_source, &fragment_source)
    }
}

unsafe fn compile_stage(
    gl: &glow::Context,
    stage: u32,
    source: &str,
) -> RenderResult<<glow::Context as HasContext>::Shader> {
    let shader = gl
        .create_shader(stage)
        .map_err(RenderError::ResourceCreationFailed)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if gl.get_shader_compile_status(shader) {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        let kind = if stage == glow::VERTEX_SHADER {
            "vertex"
        } else {
            "fragment"
        };
        Err(RenderError::ShaderCompilation(format!("{kind} shader: {log}")))
    }
}

impl ShaderProgram for GlowShader {
    fn activate(&self) {
        unsafe { self.ctx.gl().use_program(Some(self.program)) };
    }

    fn set_matrix4(&self, name: &str, matrix: &Mat4) {
        let gl = self.ctx.gl();
        unsafe {
            if let Some(location) = gl.get_uniform_location(self.program, name) {
                gl.uniform_matrix_4_f32_slice(Some(&location), false, &to_column_major(matrix));
            }
        }
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        unsafe { self.ctx.gl().get_attrib_location(self.program, name) }
    }
}

impl Drop for GlowShader {
    fn drop(&mut self) {
        unsafe { self.ctx.gl().delete_program(self.program) };
    }
}

impl std::fmt::Debug for GlowShader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowShader")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}
