//! Per-frame game systems.
//!
//! A system owns whatever state it carries between frames and works on the
//! world through a [`SystemContext`] handed in by the gameplay state.

pub mod bullet;
pub mod draw;
pub mod enemy;
pub mod enemy_spawn;
pub mod experience;
pub mod levelup_pick;
pub mod music;
pub mod particle;
pub mod physics;
pub mod player;
pub mod boss_timer;

use glam::Vec2;
use legion::storage::Component;
use legion::{Entity, World};

use crate::engine::audio::Audio;
use crate::engine::graphics::Canvas;
use crate::engine::input::InputState;
use crate::game::events::{EventQueue, GameEvent};
use crate::game::random::GameRng;
use crate::game::shape::{PrototypeLibrary, Shape};

pub use bullet::BulletSystem;
pub use draw::DrawSystem;
pub use enemy::{EnemyAttackSystem, EnemyMovementSystem};
pub use enemy_spawn::EnemySpawnSystem;
pub use experience::ExperienceSystem;
pub use levelup_pick::LevelUpPickSystem;
pub use music::MusicSystem;
pub use particle::ParticleSystem;
pub use physics::PhysicsSystem;
pub use player::{KeyboardInputSystem, PlayerStateSystem, PlayerWeaponSystem};
pub use boss_timer::BossTimerSystem;

/// Counters for the current run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub score: u32,
    pub total_time: f32,
    pub bosses_defeated: u32,
}

pub struct SystemContext<'a> {
    pub world: &'a mut World,
    pub events: &'a mut EventQueue,
    pub input: &'a InputState,
    pub canvas: &'a mut Canvas,
    pub rng: &'a mut GameRng,
    pub prototypes: &'a PrototypeLibrary,
    pub audio: &'a mut Audio,
    /// Logical screen size.
    pub screen: Vec2,
    pub player: Entity,
    pub stats: &'a RunStats,
}

impl SystemContext<'_> {
    pub fn player_shape(&mut self) -> Option<Shape> {
        read_component(self.world, self.player)
    }
}

pub trait System {
    /// Runs for every system before queued events are delivered.
    fn pre_update(&mut self, _ctx: &mut SystemContext) {}

    fn update(&mut self, ctx: &mut SystemContext, dt: f32);

    fn on_event(&mut self, _ctx: &mut SystemContext, _event: &GameEvent) {}
}

/// Copy of one component, if the entity is alive and has it.
pub fn read_component<T: Component + Clone>(world: &mut World, entity: Entity) -> Option<T> {
    let entry = world.entry(entity)?;
    let component = entry.get_component::<T>().ok()?;
    Some(component.clone())
}

/// Run `f` on one component in place.
pub fn with_component<T: Component, R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut T) -> R,
) -> Option<R> {
    let mut entry = world.entry(entity)?;
    let component = entry.get_component_mut::<T>().ok()?;
    Some(f(component))
}
