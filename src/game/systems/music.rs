use log::info;

use super::{System, SystemContext};
use crate::engine::audio::SoundId;
use crate::game::events::GameEvent;
use crate::game::geometry::{ease, lerp};

const MAX_VOLUME: f32 = 0.7;

/// Crossfades looping music tracks.
#[derive(Debug)]
pub struct MusicSystem {
    current: Option<SoundId>,
    next: Option<SoundId>,
    fade_rate: f32,
    /// 1 while only `current` is heard, 0 once `next` has fully taken over.
    primary: f32,
    fading: bool,
}

impl Default for MusicSystem {
    fn default() -> Self {
        Self {
            current: None,
            next: None,
            fade_rate: 1.0,
            primary: 1.0,
            fading: false,
        }
    }
}

impl MusicSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SoundId> {
        self.current
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// Volumes of the outgoing and incoming tracks.
    pub fn volumes(&self) -> (f32, f32) {
        let t = ease(self.primary);
        (lerp(0.0, MAX_VOLUME, t), lerp(MAX_VOLUME, 0.0, t))
    }

    /// Silence whatever is playing.
    pub fn stop(&mut self, ctx: &mut SystemContext) {
        let backend = ctx.audio.backend_mut();
        for id in [self.current.take(), self.next.take()].into_iter().flatten() {
            backend.stop(id);
        }
        self.fading = false;
        self.primary = 1.0;
    }
}

impl System for MusicSystem {
    fn update(&mut self, ctx: &mut SystemContext, dt: f32) {
        if !self.fading {
            return;
        }

        self.primary -= dt * self.fade_rate;
        let done = self.primary <= 0.0;
        self.primary = self.primary.clamp(0.0, 1.0);

        let (outgoing, incoming) = self.volumes();
        let backend = ctx.audio.backend_mut();
        if let Some(id) = self.current {
            backend.set_volume(id, outgoing);
        }
        if let Some(id) = self.next {
            backend.set_volume(id, incoming);
        }

        if done {
            if let Some(id) = self.current {
                backend.stop(id);
            }
            self.current = self.next.take();
            self.primary = 1.0;
            self.fading = false;
        }
    }

    fn on_event(&mut self, ctx: &mut SystemContext, event: &GameEvent) {
        let GameEvent::PlayMusic { bank, fade_rate } = event else {
            return;
        };

        info!("Switching music to {}", bank);
        self.next = ctx.audio.pick(bank, ctx.rng);
        self.fade_rate = *fade_rate;
        self.fading = true;
        if let Some(id) = self.next {
            let backend = ctx.audio.backend_mut();
            backend.set_volume(id, 0.0);
            backend.play(id, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::testing::Harness;

    fn play(bank: &str) -> GameEvent {
        GameEvent::PlayMusic {
            bank: bank.to_string(),
            fade_rate: 0.5,
        }
    }

    #[test]
    fn crossfade_promotes_next_track() {
        let mut harness = Harness::new();
        harness.audio.load_manifest_str("main main.ogg\nboss boss.ogg\n").unwrap();
        let mut music = MusicSystem::new();

        music.on_event(&mut harness.ctx(), &play("main"));
        music.update(&mut harness.ctx(), 2.5);
        assert_eq!(music.current(), Some(0));
        assert!(!music.is_fading());

        music.on_event(&mut harness.ctx(), &play("boss"));
        music.update(&mut harness.ctx(), 1.0);
        assert!(music.is_fading());
        let (outgoing, incoming) = music.volumes();
        assert!((outgoing - 0.35).abs() < 1e-4);
        assert!((incoming - 0.35).abs() < 1e-4);

        music.update(&mut harness.ctx(), 1.5);
        assert_eq!(music.current(), Some(1));
    }

    #[test]
    fn unknown_bank_fades_to_silence() {
        let mut harness = Harness::new();
        harness.audio.load_manifest_str("main main.ogg\n").unwrap();
        let mut music = MusicSystem::new();
        music.on_event(&mut harness.ctx(), &play("main"));
        music.update(&mut harness.ctx(), 3.0);

        music.on_event(&mut harness.ctx(), &play("missing"));
        music.update(&mut harness.ctx(), 3.0);
        assert_eq!(music.current(), None);
    }
}
