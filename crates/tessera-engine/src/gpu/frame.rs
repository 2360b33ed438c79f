//! Host-side record of one frame's draws.
//!
//! The fixed-function state set through the backend trait is snapshotted into
//! a draw record per submission. Nothing here touches the device, so the
//! bookkeeping is testable without a GPU.

use std::ops::Range;

use crate::coords::Color;
use crate::render::{BlendFactor, BlendMode, MatrixMode, PrimitiveType, VertexSource};
use crate::texture::{Sampling, TextureHandle};
use crate::transform::Transform;

use super::pipeline::{DrawUniforms, GpuVertex, PipelineKey};
use super::topology;
use super::viewport::{self, PixelViewport, ScissorRect};

/// Handle of the built-in 1x1 white texture used when nothing is bound.
pub(crate) const WHITE_TEXTURE: TextureHandle = TextureHandle(0);

/// Fixed-function state as last set through the backend trait.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FixedState {
    pub projection: [f32; 16],
    pub model_view: [f32; 16],
    pub texture_matrix: [f32; 16],
    pub blend: (BlendFactor, BlendFactor),
    /// `None` covers the whole surface.
    pub viewport: Option<PixelViewport>,
    pub texture: Option<(TextureHandle, Sampling)>,
}

impl Default for FixedState {
    fn default() -> Self {
        let identity = *Transform::IDENTITY.matrix();
        Self {
            projection: identity,
            model_view: identity,
            texture_matrix: identity,
            blend: BlendMode::Alpha.factors(),
            viewport: None,
            texture: None,
        }
    }
}

impl FixedState {
    pub(crate) fn load_matrix(&mut self, mode: MatrixMode, matrix: &[f32; 16]) {
        let slot = match mode {
            MatrixMode::ModelView => &mut self.model_view,
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::Texture => &mut self.texture_matrix,
        };
        *slot = *matrix;
    }

    /// Applies new sampling to `handle` if it is the bound texture.
    ///
    /// A texture that stays bound is not rebound, so the change has to reach
    /// the snapshot directly.
    pub(crate) fn update_sampling(&mut self, handle: TextureHandle, sampling: Sampling) {
        if let Some((bound, current)) = &mut self.texture {
            if *bound == handle {
                *current = sampling;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawRecord {
    pub key: PipelineKey,
    pub texture: (TextureHandle, Sampling),
    pub scissor: ScissorRect,
    pub uniform_index: u32,
    pub vertices: Range<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct FrameRecord {
    pub clear: Option<Color>,
    pub draws: Vec<DrawRecord>,
    pub uniforms: Vec<DrawUniforms>,
    pub vertices: Vec<GpuVertex>,
    scratch: Vec<usize>,
}

impl FrameRecord {
    pub(crate) fn is_empty(&self) -> bool {
        self.clear.is_none() && self.draws.is_empty()
    }

    /// Drops everything recorded so far and clears to `color` when encoded.
    pub(crate) fn clear_to(&mut self, color: Color) {
        self.reset();
        self.clear = Some(color);
    }

    /// Forgets the frame, keeping allocations.
    pub(crate) fn reset(&mut self) {
        self.clear = None;
        self.draws.clear();
        self.uniforms.clear();
        self.vertices.clear();
    }

    /// Records one submission under `state`.
    ///
    /// Returns `false` when nothing would be visible: too few vertices for a
    /// whole primitive, or a viewport outside the surface.
    pub(crate) fn push_draw(
        &mut self,
        state: &FixedState,
        primitive: PrimitiveType,
        source: VertexSource<'_>,
        surface: (u32, u32),
    ) -> bool {
        self.scratch.clear();
        let class = topology::expand(primitive, source.len(), &mut self.scratch);
        if self.scratch.is_empty() {
            return false;
        }

        let Some(mapping) = viewport::map_viewport(state.viewport, surface) else {
            return false;
        };

        let uniforms = DrawUniforms {
            projection: mul4(mapping.clip_adjust.matrix(), &state.projection),
            model_view: state.model_view,
            texture: state.texture_matrix,
        };
        if self.uniforms.last() != Some(&uniforms) {
            self.uniforms.push(uniforms);
        }
        let uniform_index = (self.uniforms.len() - 1) as u32;

        let first = self.vertices.len() as u32;
        self.vertices
            .extend(self.scratch.iter().map(|&i| GpuVertex::from(source.vertex(i))));
        let last = self.vertices.len() as u32;

        let record = DrawRecord {
            key: PipelineKey {
                class,
                src: state.blend.0,
                dst: state.blend.1,
            },
            texture: state.texture.unwrap_or((WHITE_TEXTURE, Sampling::default())),
            scissor: mapping.scissor,
            uniform_index,
            vertices: first..last,
        };

        // List topologies concatenate, so a draw sharing every state with the
        // previous one extends it.
        match self.draws.last_mut() {
            Some(prev)
                if prev.key == record.key
                    && prev.texture == record.texture
                    && prev.scissor == record.scissor
                    && prev.uniform_index == record.uniform_index
                    && prev.vertices.end == first =>
            {
                prev.vertices.end = last;
            }
            _ => self.draws.push(record),
        }
        true
    }
}

/// Column-major 4x4 product `a * b`.
fn mul4(a: &[f32; 16], b: &[f32; 16]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}
