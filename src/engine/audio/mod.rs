//! Sound playback seam and named sound banks.
//!
//! [`RodioBackend`] plays through the default output device. [`SilentBackend`]
//! stands in when there is no device, when audio is disabled, and in tests.

pub mod output;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::Rng;

use crate::config::AudioConfig;
use crate::error::{GameError, Result};

pub use output::RodioBackend;

pub type SoundId = usize;

pub trait AudioBackend {
    /// Files that fail to load still get an id. Playing it does nothing.
    fn load(&mut self, path: &Path) -> SoundId;
    /// Looped sounds keep playing until stopped. One-shots play to the end.
    fn play(&mut self, id: SoundId, looped: bool);
    fn stop(&mut self, id: SoundId);
    /// Applies to the running loop, if any, and to later plays of `id`.
    fn set_volume(&mut self, id: SoundId, volume: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub looped: bool,
    pub volume: f32,
}

/// Keeps the bookkeeping of a real backend without opening a device.
#[derive(Debug, Default)]
pub struct SilentBackend {
    loaded: Vec<PathBuf>,
    volumes: HashMap<SoundId, f32>,
    playing: HashMap<SoundId, Playback>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, id: SoundId) -> Option<&Path> {
        self.loaded.get(id).map(PathBuf::as_path)
    }

    #[cfg(test)]
    pub fn playback(&self, id: SoundId) -> Option<Playback> {
        self.playing.get(&id).copied()
    }

    #[cfg(test)]
    pub fn is_playing(&self, id: SoundId) -> bool {
        self.playing.contains_key(&id)
    }
}

impl AudioBackend for SilentBackend {
    fn load(&mut self, path: &Path) -> SoundId {
        self.loaded.push(path.to_path_buf());
        self.loaded.len() - 1
    }

    fn play(&mut self, id: SoundId, looped: bool) {
        debug!("play sound {} ({:?}) looped={}", id, self.path(id), looped);
        let volume = self.volumes.get(&id).copied().unwrap_or(1.0);
        // One-shots finish instantly without a mixer.
        if looped {
            self.playing.insert(id, Playback { looped, volume });
        }
    }

    fn stop(&mut self, id: SoundId) {
        debug!("stop sound {}", id);
        self.playing.remove(&id);
    }

    fn set_volume(&mut self, id: SoundId, volume: f32) {
        self.volumes.insert(id, volume);
        if let Some(playback) = self.playing.get_mut(&id) {
            playback.volume = volume;
        }
    }
}

/// Sounds grouped by bank name, loaded from a manifest of `bank path` lines.
#[derive(Debug, Default)]
pub struct AudioManager {
    banks: HashMap<String, Vec<SoundId>>,
}

impl AudioManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank lines and lines starting with `#` are ignored. Relative paths
    /// resolve against `base`.
    pub fn load_manifest(&mut self, text: &str, base: &Path, backend: &mut dyn AudioBackend) -> Result<()> {
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(name), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(GameError::AudioManifest {
                    line: index + 1,
                    message: format!("expected `bank path`, got `{line}`"),
                });
            };

            let id = backend.load(&base.join(path));
            self.banks.entry(name.to_string()).or_default().push(id);
        }

        info!("Loaded {} sound banks", self.banks.len());
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path, backend: &mut dyn AudioBackend) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        self.load_manifest(&text, base, backend)
    }

    pub fn bank(&self, name: &str) -> Option<&[SoundId]> {
        self.banks.get(name).map(Vec::as_slice)
    }

    pub fn random_sound<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<SoundId> {
        let bank = self
            .banks
            .get(name)
            .filter(|bank| !bank.is_empty())
            .ok_or_else(|| GameError::UnknownSoundBank(name.to_string()))?;
        Ok(bank[rng.gen_range(0..bank.len())])
    }
}

/// Backend plus banks, as handed to the game.
pub struct Audio {
    backend: Box<dyn AudioBackend>,
    sounds: AudioManager,
}

impl Audio {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            sounds: AudioManager::new(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentBackend::new()))
    }

    /// Opens the default output device unless audio is disabled, then loads
    /// the configured manifest. Either failure leaves the game running.
    pub fn open(config: &AudioConfig) -> Self {
        let mut audio = if !config.enabled {
            info!("Audio disabled by config");
            Self::silent()
        } else {
            match RodioBackend::new() {
                Ok(backend) => Self::new(Box::new(backend)),
                Err(e) => {
                    warn!("Continuing without audio output: {}", e);
                    Self::silent()
                }
            }
        };

        if let Some(manifest) = &config.manifest {
            if let Err(e) = audio.load_manifest(manifest) {
                warn!("Continuing without sounds: {}", e);
            }
        }
        audio
    }

    pub fn load_manifest(&mut self, path: &Path) -> Result<()> {
        self.sounds.load_file(path, self.backend.as_mut())
    }

    pub fn load_manifest_str(&mut self, text: &str) -> Result<()> {
        self.sounds.load_manifest(text, Path::new("."), self.backend.as_mut())
    }

    pub fn sounds(&self) -> &AudioManager {
        &self.sounds
    }

    pub fn backend_mut(&mut self) -> &mut dyn AudioBackend {
        self.backend.as_mut()
    }

    /// Pick a sound from `bank`. Missing banks log a warning and yield `None`.
    pub fn pick<R: Rng + ?Sized>(&self, bank: &str, rng: &mut R) -> Option<SoundId> {
        match self.sounds.random_sound(bank, rng) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Fire-and-forget effect from a bank.
    pub fn play_random<R: Rng + ?Sized>(&mut self, bank: &str, rng: &mut R) {
        if let Some(id) = self.pick(bank, rng) {
            self.backend.play(id, false);
        }
    }
}
