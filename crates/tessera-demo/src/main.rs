mod pong;

use anyhow::Context;
use image::{DynamicImage, Rgba, RgbaImage};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use tessera_engine::coords::{Color, Rect, Vector2};
use tessera_engine::core::{App, AppControl, FrameCtx};
use tessera_engine::gpu::{GpuInit, WgpuBackend};
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::render::{BlendMode, PrimitiveType, RenderStates, RenderTarget, Vertex};
use tessera_engine::sprite::Sprite;
use tessera_engine::texture::Texture;
use tessera_engine::view::View;
use tessera_engine::window::{Runtime, RuntimeConfig};

use pong::{Pong, Side, ARENA};

const TILE: u32 = 8;

struct PongApp {
    game: Pong,
    tiles: Option<Texture>,
    net: Vec<Vertex>,
}

impl PongApp {
    fn new() -> Self {
        Self {
            game: Pong::new(),
            tiles: None,
            net: net_vertices(),
        }
    }
}

impl App for PongApp {
    fn on_init(&mut self, target: &mut RenderTarget<WgpuBackend>) -> anyhow::Result<()> {
        let mut tiles = Texture::create(target.backend_mut(), &checker(TILE))
            .context("failed to upload tile texture")?;
        tiles.set_repeated(target.backend_mut(), true);
        self.tiles = Some(tiles);
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Some(side) = self.game.step(ctx.time.dt) {
            let [left, right] = self.game.score;
            log::info!("{side:?} scores: {left} - {right}");
        }

        let mut arena = View::from_rect(Rect::new(0.0, 0.0, ARENA.x, ARENA.y));
        arena.set_viewport(pong::letterbox(ctx.size()));
        ctx.target.set_view(&arena);

        // More than four vertices: drawn with the transform loaded on the backend.
        ctx.target.render(
            &self.net,
            PrimitiveType::Quads,
            &RenderStates::DEFAULT.with_blend_mode(BlendMode::Add),
        );

        let Some(tiles) = self.tiles.as_ref() else {
            return AppControl::Continue;
        };
        for (body, color) in [
            (&self.game.left, side_color(Side::Left)),
            (&self.game.right, side_color(Side::Right)),
            (&self.game.ball, Color::WHITE),
        ] {
            let mut sprite = Sprite::new(tiles);
            sprite.set_texture_rect(Rect::from_position_size(Vector2::zero(), body.size));
            sprite.set_color(color);
            *sprite.transformable_mut() = body.transform.clone();
            ctx.target.draw(&sprite, RenderStates::DEFAULT);
        }

        AppControl::Continue
    }
}

fn side_color(side: Side) -> Color {
    match side {
        Side::Left => Color::rgb(120, 200, 255),
        Side::Right => Color::rgb(255, 170, 90),
    }
}

/// Two-tone checkerboard of `size` x `size` pixels.
fn checker(size: u32) -> DynamicImage {
    let half = size / 2;
    let image = RgbaImage::from_fn(size, size, |x, y| {
        if (x < half) == (y < half) {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([200, 200, 200, 255])
        }
    });
    DynamicImage::ImageRgba8(image)
}

/// Dashed centre line as one quad batch.
fn net_vertices() -> Vec<Vertex> {
    const DASH: Vector2 = Vector2::new(4.0, 16.0);
    const GAP: f32 = 12.0;

    let color = Color::rgba(255, 255, 255, 60);
    let left = ARENA.x / 2.0 - DASH.x / 2.0;
    let mut vertices = Vec::new();
    let mut top = GAP / 2.0;
    while top + DASH.y <= ARENA.y {
        let (right, bottom) = (left + DASH.x, top + DASH.y);
        vertices.extend([
            Vertex::colored(Vector2::new(left, top), color),
            Vertex::colored(Vector2::new(left, bottom), color),
            Vertex::colored(Vector2::new(right, bottom), color),
            Vertex::colored(Vector2::new(right, top), color),
        ]);
        top += DASH.y + GAP;
    }
    vertices
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Tessera Pong".to_string(),
        initial_size: LogicalSize::new(f64::from(ARENA.x), f64::from(ARENA.y)),
        clear_color: Color::rgb(16, 16, 24),
    };

    Runtime::run(config, GpuInit::default(), PongApp::new())
}
