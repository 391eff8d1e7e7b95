//! Boss encounters.
//!
//! Every boss is three systems run one after another by the gameplay state: a
//! lead-in that clears the field and brings the boss on, the fight itself and
//! a lead-out that celebrates the kill. The lead-in and lead-out are shared and
//! configured per boss.

pub mod big_chungus;
pub mod dark_triad;
pub mod venus_sigil;

use glam::Vec2;
use legion::{Entity, IntoQuery};
use log::{debug, info};

use crate::engine::graphics::{Canvas, Color, Layer};
use crate::game::components::Enemy;
use crate::game::events::GameEvent;
use crate::game::geometry::{ease, lerp};
use crate::game::shape::Shape;
use crate::game::systems::{System, SystemContext};

pub use big_chungus::BigChungusFactory;
pub use dark_triad::DarkTriadFactory;
pub use venus_sigil::VenusSigilFactory;

pub const LEAD_IN_TIME: f32 = 10.0;
pub const LEAD_OUT_TIME: f32 = 10.0;

const CAPTION_SCALE: f32 = 4.0;
const CAPTION_BACK_SCALE: Vec2 = Vec2::new(4.2, 4.4);

pub trait BossFactory {
    fn name(&self) -> &'static str;
    fn lead_in(&self, power: u32) -> Box<dyn System>;
    fn fight(&self, power: u32) -> Box<dyn System>;
    fn lead_out(&self, power: u32) -> Box<dyn System>;
}

/// Bosses in the order they are met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    VenusSigil,
    DarkTriad,
    BigChungus,
}

impl BossKind {
    pub const ROTATION: [BossKind; 3] = [BossKind::VenusSigil, BossKind::DarkTriad, BossKind::BigChungus];

    /// The boss met after `encounters` earlier boss fights.
    pub fn nth(encounters: usize) -> Self {
        Self::ROTATION[encounters % Self::ROTATION.len()]
    }

    pub fn factory(self) -> Box<dyn BossFactory> {
        match self {
            BossKind::VenusSigil => Box::new(VenusSigilFactory),
            BossKind::DarkTriad => Box::new(DarkTriadFactory),
            BossKind::BigChungus => Box::new(BigChungusFactory),
        }
    }
}

/// Centred text with an optional larger shadow behind it.
#[derive(Debug, Clone, Copy)]
pub struct Caption {
    pub text: &'static str,
    pub color: Color,
    pub back: Option<Color>,
}

impl Caption {
    pub const fn plain(text: &'static str) -> Self {
        Self {
            text,
            color: Color::WHITE,
            back: None,
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, alpha: f32) {
        let centre = canvas.size() / 2.0;
        let text_size = Canvas::text_size(self.text);
        if let Some(back) = self.back {
            let pos = centre - text_size * CAPTION_BACK_SCALE / 2.0;
            canvas.draw_string(pos, self.text, back.with_alpha_f32(alpha), CAPTION_BACK_SCALE);
        }
        let pos = centre - text_size * CAPTION_SCALE / 2.0;
        canvas.draw_string(pos, self.text, self.color.with_alpha_f32(alpha), Vec2::splat(CAPTION_SCALE));
    }
}

/// Fades in over the first second and out over the last.
pub fn caption_alpha(elapsed: f32, duration: f32) -> f32 {
    ease(elapsed.clamp(0.0, 1.0)) * ease((duration - elapsed).clamp(0.0, 1.0))
}

/// `count` equal health bars along the bottom of the screen.
pub fn health_bars(screen: Vec2, count: usize) -> Vec<(Vec2, Vec2)> {
    let count = count.max(1);
    let width = (screen.x - 10.0 * (count as f32 + 1.0)) / count as f32;
    let size = Vec2::new(width, 20.0);
    (0..count)
        .map(|i| (Vec2::new(10.0 + i as f32 * (10.0 + width), screen.y - 30.0), size))
        .collect()
}

/// Red bars with green fill, one fill fraction per bar.
pub fn draw_health(canvas: &mut Canvas, fractions: &[f32]) {
    let previous = canvas.layer();
    canvas.set_layer(Layer::Ui);
    for ((pos, size), fraction) in health_bars(canvas.size(), fractions.len()).into_iter().zip(fractions) {
        canvas.fill_rect(pos, size, Color::RED);
        let fill = lerp(0.0, size.x, ease(fraction.clamp(0.0, 1.0)));
        canvas.fill_rect(pos, Vec2::new(fill, size.y), Color::GREEN);
    }
    canvas.set_layer(previous);
}

/// Raw boss health in the top left corner.
pub fn draw_health_readout(canvas: &mut Canvas, health: f32) {
    let previous = canvas.layer();
    canvas.set_layer(Layer::Ui);
    canvas.draw_string(Vec2::new(10.0, 170.0), &format!("{:.0}", health), Color::WHITE, Vec2::splat(3.0));
    canvas.set_layer(previous);
}

/// Remove every enemy on the field. Nothing drops experience.
pub fn clear_enemies(ctx: &mut SystemContext) {
    let mut query = <(Entity, &Enemy, &Shape)>::query();
    let doomed: Vec<(Entity, Vec2)> = query
        .iter(ctx.world)
        .map(|(entity, _, shape)| (*entity, shape.position))
        .collect();

    debug!("Clearing {} enemies for the boss", doomed.len());
    for (entity, position) in doomed {
        ctx.events.push(GameEvent::EnemyDeath {
            position,
            gives_xp: false,
        });
        ctx.world.remove(entity);
    }
}

/// Brings the boss in, parameterised per boss.
pub struct LeadIn {
    power: u32,
    bars: usize,
    caption: Option<Caption>,
    background: Option<(Color, Color)>,
    spawn: fn(&mut SystemContext, u32) -> Entity,
    elapsed: f32,
    cleared: bool,
    spawned: bool,
}

impl LeadIn {
    pub fn new(power: u32, bars: usize, spawn: fn(&mut SystemContext, u32) -> Entity) -> Self {
        Self {
            power,
            bars,
            caption: None,
            background: None,
            spawn,
            elapsed: 0.0,
            cleared: false,
            spawned: false,
        }
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Fade the background between two colours over the lead-in.
    pub fn with_background(mut self, from: Color, to: Color) -> Self {
        self.background = Some((from, to));
        self
    }
}

impl System for LeadIn {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        if !self.cleared {
            clear_enemies(ctx);
            self.cleared = true;
        }

        self.elapsed += dt;

        if let Some((from, to)) = self.background {
            ctx.canvas.clear(from.lerp(to, ease((self.elapsed / LEAD_IN_TIME).min(1.0))));
        }

        if self.elapsed > LEAD_IN_TIME && !self.spawned {
            let entity = (self.spawn)(ctx, self.power);
            info!("Boss spawned with power {}", self.power);
            ctx.events.push(GameEvent::BeginBossMain { entity });
            self.spawned = true;
        }

        let previous = ctx.canvas.layer();
        ctx.canvas.set_layer(Layer::Ui);

        let red = Color::RED.with_alpha_f32(ease(self.elapsed.min(1.0)));
        let t = ((self.elapsed - 1.0).max(0.0) / (LEAD_IN_TIME - 1.0)).min(1.0);
        for (pos, size) in health_bars(ctx.screen, self.bars) {
            ctx.canvas.fill_rect(pos, size, red);
            ctx.canvas.fill_rect(pos, Vec2::new(lerp(0.0, size.x, ease(t)), size.y), Color::GREEN);
        }

        if let Some(caption) = &self.caption {
            caption.draw(ctx.canvas, caption_alpha(self.elapsed, LEAD_IN_TIME));
        }

        ctx.canvas.set_layer(previous);
    }
}

/// Winds the encounter down and hands control back to normal play.
pub struct LeadOut {
    bars: usize,
    caption: Option<Caption>,
    background: Option<(Color, Color)>,
    elapsed: f32,
    done: bool,
}

impl LeadOut {
    pub fn new(bars: usize) -> Self {
        Self {
            bars,
            caption: None,
            background: None,
            elapsed: 0.0,
            done: false,
        }
    }

    pub fn with_caption(mut self, caption: Caption) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn with_background(mut self, from: Color, to: Color) -> Self {
        self.background = Some((from, to));
        self
    }
}

impl System for LeadOut {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        self.elapsed += dt;

        if self.elapsed > LEAD_OUT_TIME && !self.done {
            self.done = true;
            ctx.events.push(GameEvent::BossPhaseDone);
        }

        let progress = ease((self.elapsed / LEAD_OUT_TIME).min(1.0));
        if let Some((from, to)) = self.background {
            ctx.canvas.clear(from.lerp(to, progress));
        }

        let previous = ctx.canvas.layer();
        ctx.canvas.set_layer(Layer::Ui);

        let red = Color::RED.with_alpha_f32(lerp(1.0, 0.0, progress));
        for (pos, size) in health_bars(ctx.screen, self.bars) {
            ctx.canvas.fill_rect(pos, size, red);
        }

        if let Some(caption) = &self.caption {
            caption.draw(ctx.canvas, caption_alpha(self.elapsed, LEAD_OUT_TIME));
        }

        ctx.canvas.set_layer(previous);
    }
}

/// Tracks the boss entity and reports its death once.
#[derive(Debug, Default)]
pub struct KillWatch {
    entity: Option<Entity>,
    dead: bool,
}

impl KillWatch {
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::BeginBossMain { entity } = event {
            self.entity = Some(*entity);
        }
    }

    /// Emits `BossKill` the first time the boss entity is gone.
    pub fn check(&mut self, ctx: &mut SystemContext) {
        let Some(entity) = self.entity else {
            return;
        };
        if !self.dead && !ctx.world.contains(entity) {
            self.dead = true;
            info!("Boss defeated");
            ctx.events.push(GameEvent::BossKill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::spawn;
    use crate::game::systems::testing::Harness;

    #[test]
    fn rotation_cycles() {
        assert_eq!(BossKind::nth(0), BossKind::VenusSigil);
        assert_eq!(BossKind::nth(1), BossKind::DarkTriad);
        assert_eq!(BossKind::nth(2), BossKind::BigChungus);
        assert_eq!(BossKind::nth(3), BossKind::VenusSigil);
    }

    #[test]
    fn bar_layout_matches_screen() {
        let screen = Vec2::new(1280.0, 960.0);
        let single = health_bars(screen, 1);
        assert_eq!(single, vec![(Vec2::new(10.0, 930.0), Vec2::new(1260.0, 20.0))]);

        let triple = health_bars(screen, 3);
        let width = (1280.0 - 40.0) / 3.0;
        assert!((triple[1].0.x - (20.0 + width)).abs() < 1e-3);
        assert!((triple[2].0.x - (30.0 + 2.0 * width)).abs() < 1e-3);
    }

    #[test]
    fn caption_fades_both_ends() {
        assert!(caption_alpha(0.0, 10.0) < 1e-6);
        assert!((caption_alpha(5.0, 10.0) - 1.0).abs() < 1e-6);
        assert!(caption_alpha(9.99, 10.0) < 0.01);
    }

    fn spawn_dummy(ctx: &mut SystemContext, _power: u32) -> Entity {
        spawn::enemy(ctx.world, ctx.prototypes, Vec2::new(640.0, -100.0), Color::BLUE)
    }

    #[test]
    fn lead_in_clears_then_spawns_once() {
        let mut harness = Harness::new();
        let old = spawn::enemy(&mut harness.world, &harness.prototypes, Vec2::new(10.0, 10.0), Color::YELLOW);
        let mut lead_in = LeadIn::new(0, 1, spawn_dummy).with_caption(Caption::plain("Here it comes"));

        lead_in.update(&mut harness.ctx(), 1.0);
        assert!(!harness.world.contains(old));
        assert_eq!(
            harness.events.drain(),
            vec![GameEvent::EnemyDeath {
                position: Vec2::new(10.0, 10.0),
                gives_xp: false
            }]
        );

        for _ in 0..12 {
            lead_in.update(&mut harness.ctx(), 1.0);
        }
        let begins = harness
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BeginBossMain { .. }))
            .count();
        assert_eq!(begins, 1);
    }

    #[test]
    fn lead_out_finishes_once() {
        let mut harness = Harness::new();
        let mut lead_out = LeadOut::new(1).with_background(Color::BLACK, Color::VERY_DARK_GREY);
        for _ in 0..15 {
            lead_out.update(&mut harness.ctx(), 1.0);
        }
        assert_eq!(harness.events.drain(), vec![GameEvent::BossPhaseDone]);
        assert_eq!(harness.canvas.clear_color(), Color::VERY_DARK_GREY);
    }

    #[test]
    fn kill_watch_reports_once() {
        let mut harness = Harness::new();
        let boss = spawn::enemy(&mut harness.world, &harness.prototypes, Vec2::ZERO, Color::BLUE);
        let mut watch = KillWatch::default();

        watch.check(&mut harness.ctx());
        watch.on_event(&GameEvent::BeginBossMain { entity: boss });
        watch.check(&mut harness.ctx());
        assert!(harness.events.is_empty());

        harness.world.remove(boss);
        watch.check(&mut harness.ctx());
        watch.check(&mut harness.ctx());
        assert_eq!(harness.events.drain(), vec![GameEvent::BossKill]);
    }
}
