use crate::coords::Color;
use crate::texture::{Sampling, Texture, TextureError, TextureHandle, TextureUploader};

use super::backend::{BlendFactor, GraphicsBackend, MatrixMode, VertexSource};
use super::states::PrimitiveType;
use super::vertex::Vertex;

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    InitPersistentState,
    Clear(Color),
    SetBlendFunction(BlendFactor, BlendFactor),
    LoadMatrix(MatrixMode, [f32; 16]),
    SetViewport { x: i32, y: i32, width: i32, height: i32 },
    BindTexture(Option<TextureHandle>),
    DrawPrimitives {
        primitive: PrimitiveType,
        pre_transformed: bool,
        vertices: Vec<Vertex>,
    },
    UploadTexture { handle: TextureHandle, width: u32, height: u32 },
    SetSampling { handle: TextureHandle, sampling: Sampling },
}

/// Backend that performs no rendering and keeps every call in order.
///
/// Used to observe exactly which state changes a render target issues.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_handle: u64,
    max_texture_size: Option<u32>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects uploads wider or taller than `max` texels.
    pub fn with_max_texture_size(max: u32) -> Self {
        Self { max_texture_size: Some(max), ..Self::default() }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }
}

impl GraphicsBackend for RecordingBackend {
    fn init_persistent_state(&mut self) {
        self.calls.push(BackendCall::InitPersistentState);
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(BackendCall::Clear(color));
    }

    fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(BackendCall::SetBlendFunction(src, dst));
    }

    fn load_matrix(&mut self, mode: MatrixMode, matrix: &[f32; 16]) {
        self.calls.push(BackendCall::LoadMatrix(mode, *matrix));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(BackendCall::SetViewport { x, y, width, height });
    }

    fn bind_texture(&mut self, texture: Option<&Texture>) {
        self.calls.push(BackendCall::BindTexture(texture.map(Texture::handle)));
    }

    fn draw_primitives(&mut self, primitive: PrimitiveType, vertices: VertexSource<'_>) {
        self.calls.push(BackendCall::DrawPrimitives {
            primitive,
            pre_transformed: vertices.is_pre_transformed(),
            vertices: vertices.iter().collect(),
        });
    }
}

impl TextureUploader for RecordingBackend {
    fn upload_rgba8(
        &mut self,
        width: u32,
        height: u32,
        _pixels: &[u8],
    ) -> Result<TextureHandle, TextureError> {
        if let Some(max) = self.max_texture_size {
            if width > max || height > max {
                return Err(TextureError::TooLarge { width, height, max });
            }
        }

        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.calls.push(BackendCall::UploadTexture { handle, width, height });
        Ok(handle)
    }

    fn set_sampling(&mut self, handle: TextureHandle, sampling: Sampling) {
        self.calls.push(BackendCall::SetSampling { handle, sampling });
    }
}
