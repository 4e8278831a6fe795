//! Headless graphics backend
//!
//! A software implementation of [`GraphicsContext`] that keeps the same
//! global binding model as OpenGL: texture images, buffer contents and vertex
//! array state are tracked in memory, every call is recorded, and misuse
//! (uploading with nothing bound, drawing without indices, ...) is reported
//! the way `glGetError` would, through [`HeadlessContext::take_errors`].
//!
//! Meant for tests: asserting on the exact call sequence a frame produces and
//! on the texture contents it leaves behind. The call log keeps only the most
//! recent [`DEFAULT_CALL_LOG_LIMIT`] calls unless a different limit is chosen
//! with [`HeadlessContext::with_call_limit`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use slotmap::SlotMap;

use crate::foundation::math::Mat4;
use crate::text::PixelFormat;

use super::context::{BufferTarget, GraphicsContext, VertexAttribute};
use super::shader::{ShaderProgram, POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE};
use super::RenderResult;

/// Number of calls a [`HeadlessContext`] remembers by default
pub const DEFAULT_CALL_LOG_LIMIT: usize = 4096;

slotmap::new_key_type! {
    /// Texture handle issued by [`HeadlessContext`]
    pub struct HeadlessTexture;
    /// Buffer handle issued by [`HeadlessContext`]
    pub struct HeadlessBuffer;
    /// Vertex array handle issued by [`HeadlessContext`]
    pub struct HeadlessVertexArray;
}

/// One recorded call against a [`HeadlessContext`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlCall {
    /// `create_texture` returned this handle
    CreateTexture(HeadlessTexture),
    /// `delete_texture`
    DeleteTexture(HeadlessTexture),
    /// `bind_texture`
    BindTexture(Option<HeadlessTexture>),
    /// `allocate_texture_storage`
    AllocateTextureStorage {
        /// Width in texels
        width: u32,
        /// Height in texels
        height: u32,
    },
    /// `upload_texture_pixels`
    UploadTexturePixels {
        /// Width in texels
        width: u32,
        /// Height in texels
        height: u32,
        /// Channel order of the uploaded bytes
        format: PixelFormat,
    },
    /// `set_linear_filtering`
    SetLinearFiltering,
    /// `enable_alpha_blending`
    EnableAlphaBlending,
    /// `create_vertex_array` returned this handle
    CreateVertexArray(HeadlessVertexArray),
    /// `delete_vertex_array`
    DeleteVertexArray(HeadlessVertexArray),
    /// `bind_vertex_array`
    BindVertexArray(Option<HeadlessVertexArray>),
    /// `create_buffer` returned this handle
    CreateBuffer(HeadlessBuffer),
    /// `delete_buffer`
    DeleteBuffer(HeadlessBuffer),
    /// `bind_buffer`
    BindBuffer(BufferTarget, Option<HeadlessBuffer>),
    /// `buffer_data` with this many bytes
    BufferData(BufferTarget, usize),
    /// `vertex_attribute`
    VertexAttribute(VertexAttribute),
    /// `draw_indexed_triangles`, with the texture bound at the time
    DrawIndexedTriangles {
        /// Number of indices drawn
        index_count: u32,
        /// Texture bound when the draw was issued
        texture: Option<HeadlessTexture>,
    },
}

#[derive(Debug, Default)]
struct TextureStore {
    size: Option<(u32, u32)>,
    /// Always RGBA, whatever format was uploaded
    pixels: Vec<u8>,
    linear: bool,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    element_buffer: Option<HeadlessBuffer>,
    attributes: Vec<(VertexAttribute, HeadlessBuffer)>,
}

#[derive(Debug, Default)]
struct State {
    calls: VecDeque<GlCall>,
    call_limit: usize,
    errors: Vec<String>,
    textures: SlotMap<HeadlessTexture, TextureStore>,
    buffers: SlotMap<HeadlessBuffer, Vec<u8>>,
    vertex_arrays: SlotMap<HeadlessVertexArray, VertexArrayState>,
    bound_texture: Option<HeadlessTexture>,
    bound_vertex_array: Option<HeadlessVertexArray>,
    bound_array_buffer: Option<HeadlessBuffer>,
    /// Element binding while no vertex array is bound
    loose_element_buffer: Option<HeadlessBuffer>,
    blending: bool,
}

impl State {
    fn push_call(&mut self, call: GlCall) {
        if self.call_limit == 0 {
            return;
        }
        if self.calls.len() == self.call_limit {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
    }

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("headless context error: {}", message);
        self.errors.push(message);
    }

    fn element_buffer(&self) -> Option<HeadlessBuffer> {
        match self.bound_vertex_array {
            Some(vao) => self.vertex_arrays.get(vao).and_then(|v| v.element_buffer),
            None => self.loose_element_buffer,
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<HeadlessBuffer> {
        match target {
            BufferTarget::Array => self.bound_array_buffer,
            BufferTarget::ElementArray => self.element_buffer(),
        }
    }

    /// Validate an indexed draw and return an error message if it would fail
    fn check_draw(&self, index_count: u32) -> Option<String> {
        let Some(vao) = self.bound_vertex_array else {
            return Some("draw with no vertex array bound".to_string());
        };
        let state = &self.vertex_arrays[vao];
        let Some(indices) = state.element_buffer.and_then(|b| self.buffers.get(b)) else {
            return Some("draw with no element buffer".to_string());
        };
        let needed = index_count as usize * 4;
        if indices.len() < needed {
            return Some(format!(
                "draw of {index_count} indices reads past element buffer of {} bytes",
                indices.len()
            ));
        }

        let vertex_count = state
            .attributes
            .iter()
            .filter_map(|(attr, buffer)| {
                let len = self.buffers.get(*buffer)?.len() as u32;
                let end = attr.offset + attr.components * 4;
                (len >= end && attr.stride > 0).then(|| (len - end) / attr.stride + 1)
            })
            .min()
            .unwrap_or(0);

        let max_index = indices[..needed]
            .chunks_exact(4)
            .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .max()
            .unwrap_or(0);
        if index_count > 0 && max_index >= vertex_count {
            return Some(format!(
                "index {max_index} out of range for {vertex_count} vertices"
            ));
        }
        None
    }
}

/// In-memory graphics context
#[derive(Debug)]
pub struct HeadlessContext {
    state: RefCell<State>,
}

impl HeadlessContext {
    /// Create an empty context with nothing bound
    pub fn new() -> Self {
        Self::with_call_limit(DEFAULT_CALL_LOG_LIMIT)
    }

    /// Create a context that remembers at most `limit` calls
    ///
    /// Older calls are dropped first. A limit of 0 disables the log.
    pub fn with_call_limit(limit: usize) -> Self {
        Self {
            state: RefCell::new(State {
                call_limit: limit,
                ..State::default()
            }),
        }
    }

    /// Calls recorded since creation or the last [`HeadlessContext::clear_calls`],
    /// oldest first, up to the call limit
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.iter().cloned().collect()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Drain the errors raised so far
    pub fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().errors)
    }

    /// Currently bound texture
    pub fn bound_texture(&self) -> Option<HeadlessTexture> {
        self.state.borrow().bound_texture
    }

    /// Currently bound vertex array
    pub fn bound_vertex_array(&self) -> Option<HeadlessVertexArray> {
        self.state.borrow().bound_vertex_array
    }

    /// Buffer currently bound to `target`
    pub fn bound_buffer(&self, target: BufferTarget) -> Option<HeadlessBuffer> {
        self.state.borrow().bound_buffer(target)
    }

    /// Whether no texture, vertex array or buffer is bound
    pub fn is_unbound(&self) -> bool {
        let state = self.state.borrow();
        state.bound_texture.is_none()
            && state.bound_vertex_array.is_none()
            && state.bound_array_buffer.is_none()
            && state.loose_element_buffer.is_none()
    }

    /// Whether alpha blending has been enabled
    pub fn blending_enabled(&self) -> bool {
        self.state.borrow().blending
    }

    /// Allocated dimensions of a texture
    pub fn texture_size(&self, texture: HeadlessTexture) -> Option<(u32, u32)> {
        self.state.borrow().textures.get(texture)?.size
    }

    /// Image of a texture in RGBA order
    pub fn texture_pixels(&self, texture: HeadlessTexture) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        let store = state.textures.get(texture)?;
        store.size.map(|_| store.pixels.clone())
    }

    /// Whether linear filtering was set on a texture
    pub fn texture_is_linear(&self, texture: HeadlessTexture) -> bool {
        self.state
            .borrow()
            .textures
            .get(texture)
            .is_some_and(|store| store.linear)
    }

    /// Contents of a buffer
    pub fn buffer_contents(&self, buffer: HeadlessBuffer) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(buffer).cloned()
    }

    /// Attributes recorded into a vertex array, in the order they were set
    pub fn vertex_attributes(&self, vertex_array: HeadlessVertexArray) -> Vec<VertexAttribute> {
        self.state
            .borrow()
            .vertex_arrays
            .get(vertex_array)
            .map(|vao| vao.attributes.iter().map(|(attr, _)| *attr).collect())
            .unwrap_or_default()
    }

    /// Element buffer recorded into a vertex array
    pub fn element_buffer_of(&self, vertex_array: HeadlessVertexArray) -> Option<HeadlessBuffer> {
        self.state
            .borrow()
            .vertex_arrays
            .get(vertex_array)?
            .element_buffer
    }

    /// Number of live (created and not deleted) textures
    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Number of live vertex arrays
    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    fn record(&self, call: GlCall) -> std::cell::RefMut<'_, State> {
        let mut state = self.state.borrow_mut();
        state.push_call(call);
        state
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for HeadlessContext {
    type Texture = HeadlessTexture;
    type Buffer = HeadlessBuffer;
    type VertexArray = HeadlessVertexArray;

    fn create_texture(&self) -> RenderResult<HeadlessTexture> {
        let mut state = self.state.borrow_mut();
        let texture = state.textures.insert(TextureStore::default());
        state.push_call(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn delete_texture(&self, texture: HeadlessTexture) {
        let mut state = self.record(GlCall::DeleteTexture(texture));
        if state.textures.remove(texture).is_none() {
            state.error("delete of unknown texture");
        }
        if state.bound_texture == Some(texture) {
            state.bound_texture = None;
        }
    }

    fn bind_texture(&self, texture: Option<HeadlessTexture>) {
        let mut state = self.record(GlCall::BindTexture(texture));
        if let Some(t) = texture {
            if !state.textures.contains_key(t) {
                state.error("bind of unknown texture");
                return;
            }
        }
        state.bound_texture = texture;
    }

    fn allocate_texture_storage(&self, width: u32, height: u32) {
        let mut state = self.record(GlCall::AllocateTextureStorage { width, height });
        let Some(texture) = state.bound_texture else {
            state.error("texture storage allocation with no texture bound");
            return;
        };
        let store = &mut state.textures[texture];
        store.size = Some((width, height));
        store.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn upload_texture_pixels(&self, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        let mut state = self.record(GlCall::UploadTexturePixels {
            width,
            height,
            format,
        });
        let Some(texture) = state.bound_texture else {
            state.error("texture upload with no texture bound");
            return;
        };
        if state.textures[texture].size != Some((width, height)) {
            state.error(format!(
                "texture upload of {width}x{height} does not match allocated storage"
            ));
            return;
        }
        if pixels.len() != width as usize * height as usize * 4 {
            state.error(format!(
                "texture upload expected {} bytes, got {}",
                width as usize * height as usize * 4,
                pixels.len()
            ));
            return;
        }
        let mut rgba = Vec::with_capacity(pixels.len());
        for texel in pixels.chunks_exact(4) {
            rgba.extend_from_slice(&format.decode([texel[0], texel[1], texel[2], texel[3]]));
        }
        state.textures[texture].pixels = rgba;
    }

    fn set_linear_filtering(&self) {
        let mut state = self.record(GlCall::SetLinearFiltering);
        let bound = state.bound_texture;
        match bound {
            Some(texture) => state.textures[texture].linear = true,
            None => state.error("filtering change with no texture bound"),
        }
    }

    fn enable_alpha_blending(&self) {
        self.record(GlCall::EnableAlphaBlending).blending = true;
    }

    fn create_vertex_array(&self) -> RenderResult<HeadlessVertexArray> {
        let mut state = self.state.borrow_mut();
        let vao = state.vertex_arrays.insert(VertexArrayState::default());
        state.push_call(GlCall::CreateVertexArray(vao));
        Ok(vao)
    }

    fn delete_vertex_array(&self, vertex_array: HeadlessVertexArray) {
        let mut state = self.record(GlCall::DeleteVertexArray(vertex_array));
        if state.vertex_arrays.remove(vertex_array).is_none() {
            state.error("delete of unknown vertex array");
        }
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<HeadlessVertexArray>) {
        let mut state = self.record(GlCall::BindVertexArray(vertex_array));
        if let Some(vao) = vertex_array {
            if !state.vertex_arrays.contains_key(vao) {
                state.error("bind of unknown vertex array");
                return;
            }
        }
        state.bound_vertex_array = vertex_array;
    }

    fn create_buffer(&self) -> RenderResult<HeadlessBuffer> {
        let mut state = self.state.borrow_mut();
        let buffer = state.buffers.insert(Vec::new());
        state.push_call(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn delete_buffer(&self, buffer: HeadlessBuffer) {
        let mut state = self.record(GlCall::DeleteBuffer(buffer));
        if state.buffers.remove(buffer).is_none() {
            state.error("delete of unknown buffer");
        }
        if state.bound_array_buffer == Some(buffer) {
            state.bound_array_buffer = None;
        }
        if state.loose_element_buffer == Some(buffer) {
            state.loose_element_buffer = None;
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<HeadlessBuffer>) {
        let mut state = self.record(GlCall::BindBuffer(target, buffer));
        if let Some(b) = buffer {
            if !state.buffers.contains_key(b) {
                state.error("bind of unknown buffer");
                return;
            }
        }
        let vertex_array = state.bound_vertex_array;
        match (target, vertex_array) {
            (BufferTarget::Array, _) => state.bound_array_buffer = buffer,
            (BufferTarget::ElementArray, Some(vao)) => {
                state.vertex_arrays[vao].element_buffer = buffer;
            }
            (BufferTarget::ElementArray, None) => state.loose_element_buffer = buffer,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        let mut state = self.record(GlCall::BufferData(target, data.len()));
        let bound = state.bound_buffer(target);
        match bound {
            Some(buffer) => state.buffers[buffer] = data.to_vec(),
            None => state.error(format!("buffer data for {target:?} with no buffer bound")),
        }
    }

    fn vertex_attribute(&self, attribute: VertexAttribute) {
        let mut state = self.record(GlCall::VertexAttribute(attribute));
        let (Some(vao), Some(buffer)) = (state.bound_vertex_array, state.bound_array_buffer) else {
            state.error("vertex attribute needs a bound vertex array and array buffer");
            return;
        };
        let attributes = &mut state.vertex_arrays[vao].attributes;
        attributes.retain(|(existing, _)| existing.location != attribute.location);
        attributes.push((attribute, buffer));
    }

    fn draw_indexed_triangles(&self, index_count: u32) {
        let mut state = self.state.borrow_mut();
        let texture = state.bound_texture;
        state.push_call(GlCall::DrawIndexedTriangles {
            index_count,
            texture,
        });
        let failure = state.check_draw(index_count);
        if let Some(message) = failure {
            state.error(message);
        }
    }
}

/// Shader stand-in for [`HeadlessContext`]
///
/// Remembers the last value of every matrix uniform and how often it was
/// activated. Attribute locations default to `aPosition = 0` and
/// `aTexCoord = 1`.
#[derive(Debug)]
pub struct HeadlessShader {
    locations: HashMap<String, u32>,
    matrices: RefCell<HashMap<String, Mat4>>,
    activations: Cell<usize>,
}

impl HeadlessShader {
    /// Shader exposing the standard text attributes
    pub fn new() -> Self {
        Self::with_locations([(POSITION_ATTRIBUTE, 0), (TEX_COORD_ATTRIBUTE, 1)])
    }

    /// Shader exposing exactly the given attributes
    pub fn with_locations<'a>(locations: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            locations: locations
                .into_iter()
                .map(|(name, location)| (name.to_string(), location))
                .collect(),
            matrices: RefCell::new(HashMap::new()),
            activations: Cell::new(0),
        }
    }

    /// Last matrix uploaded under `name`
    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        self.matrices.borrow().get(name).copied()
    }

    /// Number of times the program was activated
    pub fn activations(&self) -> usize {
        self.activations.get()
    }
}

impl Default for HeadlessShader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram for HeadlessShader {
    fn activate(&self) {
        self.activations.set(self.activations.get() + 1);
    }

    fn set_matrix4(&self, name: &str, matrix: &Mat4) {
        self.matrices.borrow_mut().insert(name.to_string(), *matrix);
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        self.locations.get(name).copied()
    }
}
