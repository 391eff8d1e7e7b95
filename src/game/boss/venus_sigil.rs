//! Venus Sigil: the screen goes dark and lightning keeps striking at the
//! player while the sigil drifts around.

use glam::Vec2;
use legion::Entity;
use log::trace;

use super::{draw_health, draw_health_readout, BossFactory, Caption, KillWatch, LeadIn, LeadOut};
use crate::engine::graphics::{Canvas, Color};
use crate::game::components::{Enemy, Physics, Player};
use crate::game::events::GameEvent;
use crate::game::geometry::{segment_overlaps_triangle, Segment};
use crate::game::random::GameRng;
use crate::game::shape::{Shape, ShapeKind};
use crate::game::systems::{read_component, with_component, System, SystemContext};

const HINT_TIME: f32 = 1.0;
const TRIGGER_TIME: f32 = 0.5;
const SHOW_TIME: f32 = 0.1;
const FADEOUT_TIME: f32 = 0.3;
const HINT_RANGE2: f32 = 25000.0;
const STRIKE_DAMAGE: f32 = 3.0;
const SPLIT_CHANCE: f32 = 0.3;
const SPLIT_ALPHA: f32 = 0.5;

pub fn max_health(power: u32) -> f32 {
    5000.0 + 2500.0 * power as f32
}

/// Seconds between strikes.
pub fn idle_time(power: u32) -> f32 {
    (3.0 - 0.5 * power as f32).max(1.0)
}

pub fn spawn(ctx: &mut SystemContext, power: u32) -> Entity {
    let position = Vec2::new(ctx.screen.x / 2.0, -0.4 * ctx.screen.y);
    let mut shape = ctx.prototypes.shape(ShapeKind::Star7_3, Vec2::ZERO);
    shape.scale = 20.0;
    shape.color = Color::BLUE;
    shape.move_to(position);

    let enemy = Enemy {
        health: max_health(power),
        damage: 10.0,
        ..Enemy::default()
    };
    let physics = Physics {
        angular_velocity: 0.3,
        mass: 3.0,
        ..Physics::default()
    };
    ctx.world.push((shape, enemy, physics))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltSegment {
    pub line: Segment,
    pub color: Color,
}

/// A jagged lightning bolt grown by repeated midpoint displacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bolt {
    pub segments: Vec<BoltSegment>,
}

impl Bolt {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            segments: vec![BoltSegment {
                line: Segment::new(start, end),
                color: Color::WHITE,
            }],
        }
    }

    pub fn push(&mut self, start: Vec2, end: Vec2) {
        self.segments.push(BoltSegment {
            line: Segment::new(start, end),
            color: Color::WHITE,
        });
    }

    /// Split every segment at a displaced midpoint, sometimes forking.
    pub fn iterate(&mut self, rng: &mut GameRng) {
        let mut next = Vec::with_capacity(self.segments.len() * 2);
        for segment in &self.segments {
            let Segment { start, end } = segment.line;
            let mid = segment.line.midpoint();
            let mid = mid + (rng.unit() - 0.5) * (mid - start).perp();

            let alpha = segment.color.a as f32 / 255.0;
            let color = Color::from_f32(0.7 + rng.unit() / 3.34, 0.8 + rng.unit() / 5.34, 1.0, alpha);
            next.push(BoltSegment {
                line: Segment::new(start, mid),
                color,
            });
            next.push(BoltSegment {
                line: Segment::new(mid, end),
                color,
            });

            if rng.unit() < SPLIT_CHANCE {
                // Mirror of the remaining half about the new joint.
                let x = mid + (mid - start);
                let fork_end = x + (x - end);
                next.push(BoltSegment {
                    line: Segment::new(mid, fork_end),
                    color: color.with_alpha_f32(alpha * SPLIT_ALPHA),
                });
            }
        }
        self.segments = next;
    }

    pub fn hits(&self, shape: &Shape) -> bool {
        self.segments
            .iter()
            .any(|s| shape.tris().iter().any(|t| segment_overlaps_triangle(&s.line, t)))
    }

    fn draw_where(&self, canvas: &mut Canvas, alpha: f32, keep: impl Fn(&BoltSegment) -> bool) {
        for segment in self.segments.iter().filter(|s| keep(s)) {
            let color = segment.color.with_alpha_f32(segment.color.a as f32 / 255.0 * alpha);
            canvas.draw_line(segment.line.start, segment.line.end, color);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeMode {
    Idle,
    Hint,
    Trigger,
    Show,
    Fadeout,
}

pub struct VenusSigilFight {
    power: u32,
    idle_time: f32,
    mode: StrikeMode,
    timer: f32,
    bolt: Bolt,
    did_hit: bool,
    watch: KillWatch,
}

impl VenusSigilFight {
    pub fn new(power: u32) -> Self {
        Self {
            power,
            idle_time: idle_time(power),
            mode: StrikeMode::Idle,
            timer: 0.0,
            bolt: Bolt::default(),
            did_hit: false,
            watch: KillWatch::default(),
        }
    }

    pub fn mode(&self) -> StrikeMode {
        self.mode
    }

    pub fn bolt(&self) -> &Bolt {
        &self.bolt
    }

    /// Leaves `mode` once `timer` passes `limit`, keeping the overshoot.
    fn advance(&mut self, limit: f32, next: StrikeMode) -> bool {
        if self.timer > limit {
            self.timer -= limit;
            self.mode = next;
            true
        } else {
            false
        }
    }

    fn build_bolt(&mut self, ctx: &mut SystemContext) {
        let (w, h) = (ctx.screen.x, ctx.screen.y);
        let top = Vec2::new(ctx.rng.unit() * w, 0.0);
        let bottom = Vec2::new(ctx.rng.unit() * w, h);
        let jitter = Vec2::new(ctx.rng.range(-15.0, 15.0), ctx.rng.range(-15.0, 15.0));
        let target = ctx.player_shape().map_or(ctx.screen / 2.0, |s| s.position) + jitter;

        self.bolt = Bolt::new(top, target);
        self.bolt.push(target, bottom);

        let limit = ctx.rng.unit() * 6.0 + 4.0;
        let mut i = 0.0;
        while i < limit {
            self.bolt.iterate(ctx.rng);
            i += 1.0;
        }
        trace!("Bolt built with {} segments", self.bolt.segments.len());
    }

    fn check_collision(&mut self, ctx: &mut SystemContext) {
        if self.did_hit {
            return;
        }
        let Some(shape) = ctx.player_shape() else {
            return;
        };
        if self.bolt.hits(&shape) {
            self.did_hit = true;
            with_component::<Player, _>(ctx.world, ctx.player, |p| p.health -= STRIKE_DAMAGE);
        }
    }

    fn strike(&mut self, ctx: &mut SystemContext) {
        match self.mode {
            StrikeMode::Idle => {
                self.did_hit = false;
                if self.advance(self.idle_time, StrikeMode::Hint) {
                    self.build_bolt(ctx);
                }
            }
            StrikeMode::Hint => {
                self.advance(HINT_TIME, StrikeMode::Trigger);
                let player = ctx.player_shape().map_or(Vec2::ZERO, |s| s.position);
                let range2 = HINT_RANGE2 * self.timer / HINT_TIME;
                self.bolt
                    .draw_where(ctx.canvas, 0.25, |s| (player - s.line.start).length_squared() < range2);
            }
            StrikeMode::Trigger => {
                self.check_collision(ctx);
                let reach = ctx.screen.y * self.timer / TRIGGER_TIME;
                self.advance(TRIGGER_TIME, StrikeMode::Show);
                self.bolt.draw_where(ctx.canvas, 1.0, |s| s.line.start.y < reach);
            }
            StrikeMode::Show => {
                self.check_collision(ctx);
                self.advance(SHOW_TIME, StrikeMode::Fadeout);
                self.bolt.draw_where(ctx.canvas, 1.0, |_| true);
            }
            StrikeMode::Fadeout => {
                self.check_collision(ctx);
                let alpha = (1.0 - self.timer / FADEOUT_TIME).max(0.0);
                self.bolt.draw_where(ctx.canvas, alpha, |_| true);
                self.advance(FADEOUT_TIME, StrikeMode::Idle);
            }
        }
    }
}

impl System for VenusSigilFight {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        ctx.canvas.clear(Color::BLACK);
        self.timer += dt;

        let health = self
            .watch
            .entity()
            .and_then(|boss| read_component::<Enemy>(ctx.world, boss))
            .map(|enemy| enemy.health);
        if let Some(health) = health {
            draw_health_readout(ctx.canvas, health);
        }

        self.strike(ctx);
        self.watch.check(ctx);

        draw_health(ctx.canvas, &[health.unwrap_or(0.0) / max_health(self.power)]);
    }

    fn on_event(&mut self, _ctx: &mut SystemContext, event: &GameEvent) {
        self.watch.on_event(event);
    }
}

#[derive(Debug, Default)]
pub struct VenusSigilFactory;

impl BossFactory for VenusSigilFactory {
    fn name(&self) -> &'static str {
        "Venus Sigil"
    }

    fn lead_in(&self, power: u32) -> Box<dyn System> {
        Box::new(
            LeadIn::new(power, 1, spawn)
                .with_caption(Caption::plain("Fade To Black"))
                .with_background(Color::VERY_DARK_GREY, Color::BLACK),
        )
    }

    fn fight(&self, power: u32) -> Box<dyn System> {
        Box::new(VenusSigilFight::new(power))
    }

    fn lead_out(&self, _power: u32) -> Box<dyn System> {
        Box::new(
            LeadOut::new(1)
                .with_caption(Caption {
                    text: "Obtained Venus Sigil!",
                    color: Color::BLUE,
                    back: Some(Color::VERY_DARK_BLUE),
                })
                .with_background(Color::BLACK, Color::VERY_DARK_GREY),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::testing::Harness;

    #[test]
    fn strikes_come_faster_with_power() {
        assert_eq!(idle_time(0), 3.0);
        assert_eq!(idle_time(2), 2.0);
        assert_eq!(idle_time(9), 1.0);
        assert_eq!(max_health(2), 10000.0);
    }

    #[test]
    fn iterate_doubles_segments_at_least() {
        let mut rng = GameRng::seeded(7);
        let mut bolt = Bolt::new(Vec2::ZERO, Vec2::new(0.0, 100.0));
        for _ in 0..4 {
            let before = bolt.segments.len();
            bolt.iterate(&mut rng);
            assert!(bolt.segments.len() >= before * 2);
            assert!(bolt.segments.len() <= before * 3);
        }
        assert_eq!(bolt.segments[0].line.start, Vec2::ZERO);
        assert!(bolt.segments.iter().all(|s| s.color.b == 255));
    }

    #[test]
    fn bolt_through_player_hits() {
        let mut harness = Harness::new();
        let player = harness.ctx().player_shape().unwrap();
        let bolt = Bolt::new(player.position - Vec2::new(0.0, 100.0), player.position + Vec2::new(0.0, 100.0));
        assert!(bolt.hits(&player));

        let far = Bolt::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert!(!far.hits(&player));
    }

    #[test]
    fn cycle_walks_every_mode_and_hits_once() {
        let mut harness = Harness::new();
        let mut fight = VenusSigilFight::new(0);
        let start_health = read_component::<Player>(&mut harness.world, harness.player).unwrap().health;

        let mut seen = vec![fight.mode()];
        for _ in 0..400 {
            fight.update(&mut harness.ctx(), 0.01);
            if seen.last() != Some(&fight.mode()) {
                seen.push(fight.mode());
            }
            if seen.len() == 6 {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                StrikeMode::Idle,
                StrikeMode::Hint,
                StrikeMode::Trigger,
                StrikeMode::Show,
                StrikeMode::Fadeout,
                StrikeMode::Idle
            ]
        );
        assert!(!fight.bolt().segments.is_empty());

        let health = read_component::<Player>(&mut harness.world, harness.player).unwrap().health;
        assert!(health == start_health || health == start_health - STRIKE_DAMAGE);
        assert_eq!(harness.canvas.clear_color(), Color::BLACK);
    }

    #[test]
    fn strike_damages_once() {
        let mut harness = Harness::new();
        let player = harness.ctx().player_shape().unwrap();
        let start_health = read_component::<Player>(&mut harness.world, harness.player).unwrap().health;

        let mut fight = VenusSigilFight::new(0);
        fight.mode = StrikeMode::Show;
        fight.bolt = Bolt::new(player.position - Vec2::new(0.0, 500.0), player.position + Vec2::new(0.0, 500.0));
        for _ in 0..30 {
            fight.update(&mut harness.ctx(), 0.02);
        }

        let health = read_component::<Player>(&mut harness.world, harness.player).unwrap().health;
        assert_eq!(health, start_health - STRIKE_DAMAGE);
        assert_eq!(fight.mode(), StrikeMode::Idle);
    }
}
