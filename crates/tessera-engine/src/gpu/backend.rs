use std::collections::HashMap;

use crate::coords::Color;
use crate::render::{BlendFactor, GraphicsBackend, MatrixMode, PrimitiveType, VertexSource};
use crate::texture::{Sampling, Texture, TextureError, TextureHandle, TextureUploader};

use super::frame::{FixedState, FrameRecord, WHITE_TEXTURE};
use super::pipeline::{self, DrawPipelines, DrawUniforms, GpuVertex};
use super::viewport::PixelViewport;

const INITIAL_UNIFORM_CAPACITY: usize = 64;
const INITIAL_VERTEX_CAPACITY: usize = 1024;

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// [`GraphicsBackend`] on top of wgpu.
///
/// Calls made through the trait only update host-side state and record draws;
/// [`encode_frame`](Self::encode_frame) turns the recorded frame into a single
/// render pass. The fixed-function state itself persists across frames.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_size: (u32, u32),
    max_texture_size: u32,

    pipelines: DrawPipelines,

    uniform_stride: u64,
    uniform_buffer: wgpu::Buffer,
    uniform_capacity: usize,
    uniform_bind_group: wgpu::BindGroup,

    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,

    white: GpuTexture,
    textures: HashMap<TextureHandle, GpuTexture>,
    samplers: HashMap<Sampling, wgpu::Sampler>,
    texture_bind_groups: HashMap<(TextureHandle, Sampling), wgpu::BindGroup>,
    next_handle: u64,

    state: FixedState,
    frame: FrameRecord,
    uniform_bytes: Vec<u8>,
}

impl WgpuBackend {
    /// Creates a backend drawing into `format` surfaces of `size` pixels.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        let limits = device.limits();
        let pipelines = DrawPipelines::new(&device, format);

        let uniform_stride = pipeline::uniform_stride(limits.min_uniform_buffer_offset_alignment);
        let uniform_buffer =
            create_uniform_buffer(&device, uniform_stride, INITIAL_UNIFORM_CAPACITY);
        let uniform_bind_group = create_uniform_bind_group(&device, &pipelines, &uniform_buffer);
        let vertex_buffer = create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);

        let white = create_texture(&device, &queue, 1, 1, &[255; 4], "tessera white texture");

        log::debug!(
            "wgpu backend ready: {:?}, max texture {}px, uniform stride {}",
            format,
            limits.max_texture_dimension_2d,
            uniform_stride
        );

        Self {
            device,
            queue,
            surface_size: size,
            max_texture_size: limits.max_texture_dimension_2d,
            pipelines,
            uniform_stride,
            uniform_buffer,
            uniform_capacity: INITIAL_UNIFORM_CAPACITY,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            white,
            textures: HashMap::new(),
            samplers: HashMap::new(),
            texture_bind_groups: HashMap::new(),
            next_handle: WHITE_TEXTURE.0,
            state: FixedState::default(),
            frame: FrameRecord::default(),
            uniform_bytes: Vec::new(),
        }
    }

    /// Size of the surface draws are encoded for.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
    }

    /// Frees the GPU storage behind `texture`.
    pub fn release_texture(&mut self, texture: Texture) {
        let handle = texture.handle();
        if self.textures.remove(&handle).is_some() {
            self.texture_bind_groups.retain(|(h, _), _| *h != handle);
            log::debug!("released texture {:?}", handle);
        }
    }

    /// Encodes every draw recorded since the last call into one render pass
    /// on `target`, then starts a new frame.
    pub fn encode_frame(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut frame = std::mem::take(&mut self.frame);
        if frame.is_empty() {
            self.frame = frame;
            return;
        }

        for draw in &frame.draws {
            self.pipelines.ensure(&self.device, draw.key);
            self.ensure_texture_bind_group(draw.texture);
        }
        self.upload_uniforms(&frame.uniforms);
        self.upload_vertices(&frame.vertices);

        let load = match frame.clear {
            Some(color) => {
                let [r, g, b, a] = color.to_normalized().map(f64::from);
                wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a })
            }
            None => wgpu::LoadOp::Load,
        };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessera draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            for draw in &frame.draws {
                let Some(pipeline) = self.pipelines.get(&draw.key) else {
                    continue;
                };
                let Some(textures) = self.texture_bind_groups.get(&draw.texture) else {
                    continue;
                };
                let offset = (u64::from(draw.uniform_index) * self.uniform_stride) as u32;

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                rpass.set_bind_group(1, textures, &[]);
                let scissor = draw.scissor;
                rpass.set_scissor_rect(scissor.x, scissor.y, scissor.width, scissor.height);
                rpass.draw(draw.vertices.clone(), 0..1);
            }
        }

        log::trace!(
            "encoded {} draws, {} vertices, {} uniform records",
            frame.draws.len(),
            frame.vertices.len(),
            frame.uniforms.len()
        );

        frame.reset();
        self.frame = frame;
    }

    // ── resources ──────────────────────────────────────────────────────────

    fn ensure_sampler(&mut self, sampling: Sampling) {
        if self.samplers.contains_key(&sampling) {
            return;
        }

        let filter = if sampling.smooth {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        let address = if sampling.repeated {
            wgpu::AddressMode::Repeat
        } else {
            wgpu::AddressMode::ClampToEdge
        };

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera sampler"),
            address_mode_u: address,
            address_mode_v: address,
            address_mode_w: address,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        self.samplers.insert(sampling, sampler);
    }

    fn ensure_texture_bind_group(&mut self, key: (TextureHandle, Sampling)) {
        if self.texture_bind_groups.contains_key(&key) {
            return;
        }
        self.ensure_sampler(key.1);

        let (handle, sampling) = key;
        let texture = if handle == WHITE_TEXTURE {
            &self.white
        } else if let Some(texture) = self.textures.get(&handle) {
            texture
        } else {
            log::warn!("draw references unknown texture {:?}; drawing untextured", handle);
            &self.white
        };
        let Some(sampler) = self.samplers.get(&sampling) else {
            return;
        };

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera texture bind group"),
            layout: self.pipelines.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.texture_bind_groups.insert(key, bind_group);
    }

    fn upload_uniforms(&mut self, uniforms: &[DrawUniforms]) {
        if uniforms.is_empty() {
            return;
        }

        if uniforms.len() > self.uniform_capacity {
            let capacity = uniforms.len().next_power_of_two();
            self.uniform_buffer =
                create_uniform_buffer(&self.device, self.uniform_stride, capacity);
            self.uniform_bind_group =
                create_uniform_bind_group(&self.device, &self.pipelines, &self.uniform_buffer);
            self.uniform_capacity = capacity;
        }

        let stride = self.uniform_stride as usize;
        self.uniform_bytes.clear();
        self.uniform_bytes.resize(uniforms.len() * stride, 0);
        for (chunk, record) in self.uniform_bytes.chunks_exact_mut(stride).zip(uniforms) {
            let bytes = bytemuck::bytes_of(record);
            chunk[..bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_bytes);
    }

    fn upload_vertices(&mut self, vertices: &[GpuVertex]) {
        if vertices.is_empty() {
            return;
        }

        if vertices.len() > self.vertex_capacity {
            let capacity = vertices.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.device, capacity);
            self.vertex_capacity = capacity;
        }
        self.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }
}

impl GraphicsBackend for WgpuBackend {
    fn init_persistent_state(&mut self) {
        // No depth, lighting or culling exist in the pipelines; only the
        // tracked state needs resetting.
        self.state = FixedState::default();
        log::debug!("wgpu backend state reset");
    }

    fn clear(&mut self, color: Color) {
        self.frame.clear_to(color);
    }

    fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.blend = (src, dst);
    }

    fn load_matrix(&mut self, mode: MatrixMode, matrix: &[f32; 16]) {
        self.state.load_matrix(mode, matrix);
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.viewport = Some(PixelViewport { x, y, width, height });
    }

    fn bind_texture(&mut self, texture: Option<&Texture>) {
        self.state.texture = texture.map(|t| (t.handle(), t.sampling()));
    }

    fn draw_primitives(&mut self, primitive: PrimitiveType, vertices: VertexSource<'_>) {
        if !self.frame.push_draw(&self.state, primitive, vertices, self.surface_size) {
            log::trace!("skipped invisible {:?} batch of {} vertices", primitive, vertices.len());
        }
    }
}

impl TextureUploader for WgpuBackend {
    fn upload_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, TextureError> {
        let max = self.max_texture_size;
        if width > max || height > max {
            return Err(TextureError::TooLarge { width, height, max });
        }
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);

        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        let texture = create_texture(
            &self.device,
            &self.queue,
            width,
            height,
            pixels,
            "tessera texture",
        );
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn set_sampling(&mut self, handle: TextureHandle, sampling: Sampling) {
        self.ensure_sampler(sampling);
        self.state.update_sampling(handle, sampling);
        log::trace!("texture {:?} sampling now {:?}", handle, sampling);
    }
}

// ── creation helpers ──────────────────────────────────────────────────────

fn create_uniform_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tessera uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_bind_group(
    device: &wgpu::Device,
    pipelines: &DrawPipelines,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tessera uniforms bind group"),
        layout: pipelines.uniform_layout(),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    })
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tessera vertices"),
        size: (capacity * std::mem::size_of::<GpuVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    width: u32,
    height: u32,
    pixels: &[u8],
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    GpuTexture {
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        _texture: texture,
    }
}
