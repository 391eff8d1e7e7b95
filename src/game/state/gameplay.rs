//! The game proper: owns the world, runs the systems and reacts to events.

use glam::Vec2;
use legion::{Entity, World};
use log::{debug, info};
use winit::keyboard::KeyCode;

use super::{Frame, GameStateKind, State};
use crate::config::GameplayConfig;
use crate::engine::audio::Audio;
use crate::engine::graphics::{Canvas, Color, Layer};
use crate::engine::input::InputState;
use crate::game::boss::BossKind;
use crate::game::components::{Physics, Player};
use crate::game::events::{EventQueue, GameEvent, Upgrade};
use crate::game::random::GameRng;
use crate::game::shape::{self, PrototypeLibrary, Shape};
use crate::game::spawn;
use crate::game::systems::physics::STEP;
use crate::game::systems::{
    read_component, with_component, BossTimerSystem, BulletSystem, DrawSystem, EnemyAttackSystem,
    EnemyMovementSystem, EnemySpawnSystem, ExperienceSystem, KeyboardInputSystem, LevelUpPickSystem,
    MusicSystem, ParticleSystem, PhysicsSystem, PlayerStateSystem, PlayerWeaponSystem, RunStats, System,
    SystemContext,
};
use crate::game::weapon::Weapon;

const PLAYER_THRUST: f32 = 5000.0;
const MUSIC_FADE_RATE: f32 = 0.5;
const HUD_SCALE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubState {
    Normal,
    LevelUpScreen,
    BossLeadIn,
    Boss,
    BossLeadOut,
    Pause,
}

/// Everything the systems share.
struct Session {
    world: World,
    events: EventQueue,
    rng: GameRng,
    prototypes: PrototypeLibrary,
    stats: RunStats,
    player: Entity,
    screen: Vec2,
}

impl Session {
    fn ctx<'a>(
        &'a mut self,
        input: &'a InputState,
        canvas: &'a mut Canvas,
        audio: &'a mut Audio,
    ) -> SystemContext<'a> {
        SystemContext {
            world: &mut self.world,
            events: &mut self.events,
            input,
            canvas,
            rng: &mut self.rng,
            prototypes: &self.prototypes,
            audio,
            screen: self.screen,
            player: self.player,
            stats: &self.stats,
        }
    }
}

struct Systems {
    physics: PhysicsSystem,
    enemy_movement: EnemyMovementSystem,
    enemy_attack: EnemyAttackSystem,
    input: KeyboardInputSystem,
    enemy_spawn: EnemySpawnSystem,
    bullet: BulletSystem,
    particle: ParticleSystem,
    player_weapons: PlayerWeaponSystem,
    experience: ExperienceSystem,
    player_state: PlayerStateSystem,
    levelup_pick: LevelUpPickSystem,
    boss_timer: BossTimerSystem,
    draw: DrawSystem,
    music: MusicSystem,
}

impl Systems {
    fn new(config: &GameplayConfig) -> Self {
        Self {
            physics: PhysicsSystem::new(),
            enemy_movement: EnemyMovementSystem,
            enemy_attack: EnemyAttackSystem,
            input: KeyboardInputSystem,
            enemy_spawn: EnemySpawnSystem::new(config),
            bullet: BulletSystem,
            particle: ParticleSystem,
            player_weapons: PlayerWeaponSystem,
            experience: ExperienceSystem,
            player_state: PlayerStateSystem,
            levelup_pick: LevelUpPickSystem::new(),
            boss_timer: BossTimerSystem::new(config.boss_interval),
            draw: DrawSystem,
            music: MusicSystem::new(),
        }
    }

    fn all(&mut self) -> [&mut dyn System; 14] {
        [
            &mut self.physics,
            &mut self.enemy_movement,
            &mut self.draw,
            &mut self.input,
            &mut self.enemy_spawn,
            &mut self.bullet,
            &mut self.particle,
            &mut self.enemy_attack,
            &mut self.player_weapons,
            &mut self.experience,
            &mut self.player_state,
            &mut self.levelup_pick,
            &mut self.boss_timer,
            &mut self.music,
        ]
    }
}

/// The three scripted phases of one boss.
struct BossEncounter {
    name: String,
    lead_in: Box<dyn System>,
    fight: Box<dyn System>,
    lead_out: Box<dyn System>,
}

pub struct GameplayState {
    session: Session,
    systems: Systems,
    boss: Option<BossEncounter>,
    boss_encounters: usize,
    current: SubState,
    previous: SubState,
    next: SubState,
    /// Where the level-up screen returns once a choice is made.
    resume: SubState,
}

/// Moves to `to`, or to `to` after the pick when a level-up screen is queued.
fn route(next: &mut SubState, resume: &mut SubState, to: SubState) {
    if *next == SubState::LevelUpScreen {
        *resume = to;
    } else {
        *next = to;
    }
}

impl GameplayState {
    pub fn new(config: &GameplayConfig, screen: Vec2) -> Self {
        let prototypes = PrototypeLibrary::new();
        let mut world = World::default();
        let player = spawn::player(&mut world, &prototypes, screen);

        Self {
            session: Session {
                world,
                events: EventQueue::new(),
                rng: GameRng::from_seed_option(config.seed),
                prototypes,
                stats: RunStats::default(),
                player,
                screen,
            },
            systems: Systems::new(config),
            boss: None,
            boss_encounters: 0,
            current: SubState::Normal,
            previous: SubState::Normal,
            next: SubState::Normal,
            resume: SubState::Normal,
        }
    }

    pub fn sub_state(&self) -> SubState {
        self.current
    }

    pub fn stats(&self) -> &RunStats {
        &self.session.stats
    }

    pub fn world(&self) -> &World {
        &self.session.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.session.world
    }

    pub fn player(&self) -> Entity {
        self.session.player
    }

    pub fn boss_name(&self) -> Option<&str> {
        self.boss.as_ref().map(|boss| boss.name.as_str())
    }

    /// Queue an event for delivery next frame.
    pub fn push_event(&mut self, event: GameEvent) {
        self.session.events.push(event);
    }

    fn apply_upgrade(&mut self, upgrade: Upgrade) {
        let session = &mut self.session;
        let slots = read_component::<Shape>(&mut session.world, session.player)
            .map_or(0, |shape| shape.weapon_point_count());

        match upgrade {
            Upgrade::GainWeapon(kind) => {
                let weapon = Weapon::new(kind, &session.prototypes);
                with_component::<Player, _>(&mut session.world, session.player, |player| {
                    if player.weapons.len() < slots {
                        info!("Gained a {} weapon", weapon.name());
                        player.weapons.push(weapon);
                    }
                });
            }
            Upgrade::ImproveWeapon { slot } => {
                with_component::<Player, _>(&mut session.world, session.player, |player| {
                    if let Some(weapon) = player.weapons.get_mut(slot) {
                        weapon.level_up(1);
                        info!("{} weapon now level {}", weapon.name(), weapon.level());
                    }
                });
            }
        }
    }

    /// True from the moment a level-up screen is queued until its choice lands.
    fn picking(&self) -> bool {
        self.next == SubState::LevelUpScreen
            || self.current == SubState::LevelUpScreen
            || (self.current == SubState::Pause && self.previous == SubState::LevelUpScreen)
    }

    fn start_boss(&mut self, name: &str, power: u32) {
        let kind = BossKind::nth(self.boss_encounters);
        self.boss_encounters += 1;
        let factory = kind.factory();
        info!("{}: {} arrives with power {}", name, factory.name(), power);

        self.boss = Some(BossEncounter {
            name: factory.name().to_string(),
            lead_in: factory.lead_in(power),
            fight: factory.fight(power),
            lead_out: factory.lead_out(power),
        });
        route(&mut self.next, &mut self.resume, SubState::BossLeadIn);
    }

    fn upgrade_player_shape(&mut self) {
        let session = &mut self.session;
        let Some(current) = read_component::<Shape>(&mut session.world, session.player) else {
            return;
        };
        let Some(kind) = shape::next_progression(&current) else {
            return;
        };
        let prototype = session.prototypes.get(kind);
        with_component::<Shape, _>(&mut session.world, session.player, |shape| shape.set_prototype(prototype));
        info!("Player is now a {:?}", kind);
    }

    /// Gameplay's own reaction to an event, before systems see it.
    fn handle_event(&mut self, audio: &mut Audio, event: &GameEvent) {
        let session = &mut self.session;
        match event {
            GameEvent::EnemyDeath { position, gives_xp } => {
                session.stats.score += 1;
                spawn::death_burst(&mut session.world, &session.prototypes, &mut session.rng, *position);
                if *gives_xp {
                    session.events.push(GameEvent::SpawnExperience {
                        position: *position,
                        value: 1.0,
                        age: 0.0,
                    });
                }
            }
            GameEvent::PlayerInput {
                move_direction,
                aim_direction,
                ..
            } => {
                with_component::<Physics, _>(&mut session.world, session.player, |p| {
                    p.force = *move_direction * PLAYER_THRUST;
                });
                with_component::<Player, _>(&mut session.world, session.player, |p| {
                    for weapon in &mut p.weapons {
                        weapon.aim(*aim_direction);
                    }
                });
            }
            GameEvent::SpawnGroup(descriptor) => {
                spawn::group(
                    &mut session.world,
                    &session.prototypes,
                    &mut session.rng,
                    session.screen,
                    descriptor,
                );
            }
            GameEvent::SpawnEnemy { position, color } => {
                spawn::enemy(&mut session.world, &session.prototypes, *position, *color);
            }
            GameEvent::SpawnBullet(bullet) => {
                spawn::bullet(&mut session.world, &session.prototypes, bullet);
            }
            GameEvent::SpawnExperience { position, value, age } => {
                spawn::experience(
                    &mut session.world,
                    &session.prototypes,
                    &mut session.rng,
                    *position,
                    *value,
                    *age,
                );
            }
            GameEvent::LevelUp => {
                // A second level-up before the pick shares the same screen.
                if !self.picking() {
                    self.resume = match self.next {
                        SubState::Pause if self.current == SubState::Pause => self.previous,
                        SubState::Pause => self.current,
                        next => next,
                    };
                    self.next = SubState::LevelUpScreen;
                }
            }
            GameEvent::LevelUpChosen(upgrade) => {
                self.apply_upgrade(*upgrade);
                self.next = self.resume;
            }
            GameEvent::SpawnBoss { name, power } => {
                self.start_boss(name, *power);
            }
            GameEvent::BeginBossMain { .. } => {
                info!("Boss fight begins");
                route(&mut self.next, &mut self.resume, SubState::Boss);
                session.events.push(GameEvent::PlayMusic {
                    bank: String::from("boss"),
                    fade_rate: MUSIC_FADE_RATE,
                });
            }
            GameEvent::BossKill => {
                session.stats.bosses_defeated += 1;
                route(&mut self.next, &mut self.resume, SubState::BossLeadOut);
                self.upgrade_player_shape();
            }
            GameEvent::BossPhaseDone => {
                info!("Back to normal play");
                route(&mut self.next, &mut self.resume, SubState::Normal);
                self.boss = None;
                session.events.push(GameEvent::PlayMusic {
                    bank: String::from("main"),
                    fade_rate: MUSIC_FADE_RATE,
                });
            }
            GameEvent::PlayRandomEffect { bank } => {
                audio.play_random(bank, &mut session.rng);
            }
            GameEvent::PlayMusic { .. } => {}
        }
    }

    fn deliver_events(&mut self, frame: &mut Frame) {
        let events = self.session.events.drain();
        for event in &events {
            debug!("Event {:?}", event);
            self.handle_event(frame.audio, event);

            let mut ctx = self.session.ctx(frame.input, frame.canvas, frame.audio);
            for system in self.systems.all() {
                system.on_event(&mut ctx, event);
            }
            if let Some(boss) = &mut self.boss {
                boss.lead_in.on_event(&mut ctx, event);
                boss.fight.on_event(&mut ctx, event);
                boss.lead_out.on_event(&mut ctx, event);
            }
        }
    }

    fn run_systems(&mut self, frame: &mut Frame, dt: f32) {
        let current = self.current;
        let mut ctx = self.session.ctx(frame.input, frame.canvas, frame.audio);
        let systems = &mut self.systems;

        match current {
            SubState::Pause => {}
            SubState::LevelUpScreen => systems.levelup_pick.update(&mut ctx, dt),
            _ => {
                systems.enemy_movement.update(&mut ctx, dt);
                systems.enemy_attack.update(&mut ctx, dt);
                systems.experience.update(&mut ctx, dt);
                systems.physics.update(&mut ctx, dt);
                systems.player_weapons.update(&mut ctx, dt);
                systems.input.update(&mut ctx, dt);
                if current == SubState::Normal {
                    systems.enemy_spawn.update(&mut ctx, dt);
                    systems.boss_timer.update(&mut ctx, dt);
                }
                if let Some(boss) = &mut self.boss {
                    match current {
                        SubState::BossLeadIn => boss.lead_in.update(&mut ctx, dt),
                        SubState::Boss => boss.fight.update(&mut ctx, dt),
                        SubState::BossLeadOut => boss.lead_out.update(&mut ctx, dt),
                        _ => {}
                    }
                }
                systems.bullet.update(&mut ctx, dt);
                systems.particle.update(&mut ctx, dt);
                systems.player_state.update(&mut ctx, dt);
            }
        }

        systems.music.update(&mut ctx, dt);
        systems.draw.update(&mut ctx, dt);
    }

    fn draw_hud(&mut self, canvas: &mut Canvas) {
        let session = &mut self.session;
        let Some(player) = read_component::<Player>(&mut session.world, session.player) else {
            return;
        };
        let lines = [
            format!("Score : {}", session.stats.score),
            format!("Timer : {:.1}", session.stats.total_time),
            format!("Level : {}", player.level),
            format!("Health: {}", player.health),
            format!("Xp    : {:.0}", player.experience),
        ];

        canvas.set_layer(Layer::Ui);
        for (i, line) in lines.iter().enumerate() {
            let pos = Vec2::new(10.0, 10.0 + 30.0 * i as f32);
            canvas.draw_string(pos, line, Color::WHITE, Vec2::splat(HUD_SCALE));
        }
        if self.current == SubState::Pause {
            let text = "PAUSED";
            let scale = Vec2::splat(6.0);
            let pos = (canvas.size() - Canvas::text_size(text) * scale) / 2.0;
            canvas.draw_string(pos, text, Color::WHITE, scale);
        }
        canvas.set_layer(Layer::Game);
    }
}

impl State for GameplayState {
    fn enter(&mut self, _frame: &mut Frame) {
        info!("Gameplay started");
        self.session.events.push(GameEvent::PlayMusic {
            bank: String::from("main"),
            fade_rate: MUSIC_FADE_RATE,
        });
    }

    fn update(&mut self, frame: &mut Frame, dt: f32) -> GameStateKind {
        let dt = dt.min(STEP);
        frame.canvas.clear(Color::VERY_DARK_GREY);

        if self.next != self.current {
            debug!("Sub-state {:?} -> {:?}", self.current, self.next);
            self.previous = self.current;
            self.current = self.next;
        }

        if frame.input.key_pressed(KeyCode::Space) {
            self.next = if self.next != SubState::Pause {
                SubState::Pause
            } else {
                self.previous
            };
        }

        {
            let mut ctx = self.session.ctx(frame.input, frame.canvas, frame.audio);
            for system in self.systems.all() {
                system.pre_update(&mut ctx);
            }
        }

        self.deliver_events(frame);
        self.run_systems(frame, dt);

        if self.current != SubState::Pause {
            self.session.stats.total_time += dt;
        }
        self.draw_hud(frame.canvas);

        GameStateKind::Gameplay
    }

    fn exit(&mut self, frame: &mut Frame) {
        let mut ctx = self.session.ctx(frame.input, frame.canvas, frame.audio);
        self.systems.music.stop(&mut ctx);
    }
}
