//! Self-playing pong: pure game state, no rendering.

use tessera_engine::coords::{Rect, Vector2};
use tessera_engine::transform::Transformable;

pub const ARENA: Vector2 = Vector2::new(800.0, 600.0);
pub const BALL_SPEED: f32 = 300.0;
pub const PADDLE_SPEED: f32 = 240.0;
/// Ball spin, degrees per second.
pub const BALL_SPIN: f32 = 180.0;

const PADDLE_SIZE: Vector2 = Vector2::new(16.0, 64.0);
const BALL_SIZE: Vector2 = Vector2::new(16.0, 16.0);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// A moving rectangle. The transform's origin is the rectangle's centre.
#[derive(Debug, Clone)]
pub struct Body {
    pub transform: Transformable,
    pub size: Vector2,
    pub velocity: Vector2,
}

impl Body {
    fn new(center: Vector2, size: Vector2) -> Self {
        let mut transform = Transformable::new();
        transform.set_origin(size / 2.0);
        transform.set_position(center);
        Self {
            transform,
            size,
            velocity: Vector2::zero(),
        }
    }

    pub fn center(&self) -> Vector2 {
        self.transform.position()
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_position_size(self.center() - self.size / 2.0, self.size)
    }

    fn advance(&mut self, dt: f32) {
        self.transform.move_by(self.velocity * dt);
    }
}

#[derive(Debug, Clone)]
pub struct Pong {
    pub left: Body,
    pub right: Body,
    pub ball: Body,
    pub score: [u32; 2],
}

impl Pong {
    pub fn new() -> Self {
        let mut ball = Body::new(ARENA / 2.0, BALL_SIZE);
        ball.velocity = Vector2::new(BALL_SPEED, BALL_SPEED);
        Self {
            left: Body::new(Vector2::new(5.0 + PADDLE_SIZE.x / 2.0, ARENA.y / 2.0), PADDLE_SIZE),
            right: Body::new(
                Vector2::new(ARENA.x - 5.0 - PADDLE_SIZE.x / 2.0, ARENA.y / 2.0),
                PADDLE_SIZE,
            ),
            ball,
            score: [0, 0],
        }
    }

    /// Advances the game by `dt` seconds. Returns the side that scored, if any.
    pub fn step(&mut self, dt: f32) -> Option<Side> {
        let mut scored = None;
        let bounds = self.ball.bounds();

        if bounds.left < 0.0 {
            self.ball.velocity.x = BALL_SPEED;
            self.score[1] += 1;
            scored = Some(Side::Right);
        }
        if bounds.right() >= ARENA.x {
            self.ball.velocity.x = -BALL_SPEED;
            self.score[0] += 1;
            scored = Some(Side::Left);
        }
        if bounds.top < 0.0 {
            self.ball.velocity.y = BALL_SPEED;
        }
        if bounds.bottom() >= ARENA.y {
            self.ball.velocity.y = -BALL_SPEED;
        }

        if self.left.bounds().intersects_with(bounds) {
            self.ball.velocity.x = BALL_SPEED;
        }
        if self.right.bounds().intersects_with(bounds) {
            self.ball.velocity.x = -BALL_SPEED;
        }

        let target_y = self.ball.center().y;
        for paddle in [&mut self.left, &mut self.right] {
            paddle.velocity.y = track(paddle.center().y, target_y, dt);
            paddle.advance(dt);
        }

        self.ball.advance(dt);
        self.ball.transform.rotate(BALL_SPIN * dt);
        scored
    }
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

/// Velocity that moves `from` towards `to` without overshooting, capped at
/// the paddle speed.
fn track(from: f32, to: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    let wanted = (to - from) / dt;
    wanted.clamp(-PADDLE_SPEED, PADDLE_SPEED)
}

/// Viewport (fractions of the target) showing `ARENA` at its aspect ratio,
/// centred, with bars on the remaining sides.
pub fn letterbox(target: Vector2) -> Rect {
    let target_ratio = target.x / target.y;
    let arena_ratio = ARENA.x / ARENA.y;
    if !target_ratio.is_finite() || target_ratio <= 0.0 {
        return Rect::new(0.0, 0.0, 1.0, 1.0);
    }

    if target_ratio > arena_ratio {
        let width = arena_ratio / target_ratio;
        Rect::new((1.0 - width) / 2.0, 0.0, width, 1.0)
    } else {
        let height = target_ratio / arena_ratio;
        Rect::new(0.0, (1.0 - height) / 2.0, 1.0, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_bounces_off_the_floor() {
        let mut game = Pong::new();
        game.ball.transform.set_position(Vector2::new(400.0, ARENA.y - 4.0));
        game.ball.velocity = Vector2::new(BALL_SPEED, BALL_SPEED);

        assert_eq!(game.step(0.001), None);
        assert_eq!(game.ball.velocity.y, -BALL_SPEED);
    }

    #[test]
    fn leaving_left_edge_scores_for_right() {
        let mut game = Pong::new();
        game.ball.transform.set_position(Vector2::new(4.0, 100.0));
        // Keep the left paddle away from the ball.
        game.left.transform.set_position(Vector2::new(13.0, 500.0));

        assert_eq!(game.step(0.0), Some(Side::Right));
        assert_eq!(game.score, [0, 1]);
        assert_eq!(game.ball.velocity.x, BALL_SPEED);
    }

    #[test]
    fn paddle_returns_the_ball() {
        let mut game = Pong::new();
        let paddle = game.right.center();
        game.ball.transform.set_position(Vector2::new(paddle.x - 12.0, paddle.y));
        game.ball.velocity.x = BALL_SPEED;

        game.step(0.0);
        assert_eq!(game.ball.velocity.x, -BALL_SPEED);
    }

    #[test]
    fn paddles_chase_the_ball_at_bounded_speed() {
        let mut game = Pong::new();
        game.ball.transform.set_position(Vector2::new(400.0, 50.0));
        game.ball.velocity = Vector2::zero();
        let before = game.left.center().y;

        game.step(0.1);
        let moved = before - game.left.center().y;
        assert!((moved - PADDLE_SPEED * 0.1).abs() < 1e-3, "{moved}");
    }

    #[test]
    fn ball_spins() {
        let mut game = Pong::new();
        game.step(0.5);
        assert!((game.ball.transform.rotation() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn letterbox_keeps_arena_aspect() {
        assert_eq!(letterbox(Vector2::new(800.0, 600.0)), Rect::new(0.0, 0.0, 1.0, 1.0));

        let wide = letterbox(Vector2::new(1600.0, 600.0));
        assert_eq!(wide, Rect::new(0.25, 0.0, 0.5, 1.0));

        let tall = letterbox(Vector2::new(800.0, 1200.0));
        assert_eq!(tall, Rect::new(0.0, 0.25, 1.0, 0.5));
    }
}
