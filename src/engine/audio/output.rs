//! Playback on the default output device through rodio.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{AudioBackend, SoundId};
use crate::error::Result;

pub type SoundStream = Box<dyn Source<Item = i16> + Send>;

/// Encoded sound files held in memory. Each play decodes its own stream.
#[derive(Debug, Default)]
pub struct ClipStore {
    clips: Vec<Option<Arc<[u8]>>>,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> SoundId {
        let clip = match std::fs::read(path) {
            Ok(bytes) => Some(Arc::from(bytes)),
            Err(e) => {
                warn!("Cannot read sound {}: {}", path.display(), e);
                None
            }
        };
        self.clips.push(clip);
        self.clips.len() - 1
    }

    pub fn get(&self, id: SoundId) -> Option<Arc<[u8]>> {
        self.clips.get(id).and_then(|clip| clip.clone())
    }
}

pub fn decode(clip: Arc<[u8]>, looped: bool) -> Result<SoundStream> {
    let decoder = Decoder::new(Cursor::new(clip))?;
    if looped {
        Ok(Box::new(decoder.repeat_infinite()))
    } else {
        Ok(Box::new(decoder))
    }
}

pub struct RodioBackend {
    // Dropping the stream closes the device.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: ClipStore,
    loops: HashMap<SoundId, Sink>,
    volumes: HashMap<SoundId, f32>,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()?;
        info!("Opened default audio output");
        Ok(Self {
            _stream: stream,
            handle,
            clips: ClipStore::new(),
            loops: HashMap::new(),
            volumes: HashMap::new(),
        })
    }

    fn start(&mut self, id: SoundId, looped: bool) -> Result<()> {
        let Some(clip) = self.clips.get(id) else {
            return Ok(());
        };

        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(self.volumes.get(&id).copied().unwrap_or(1.0));
        sink.append(decode(clip, looped)?);

        if looped {
            if let Some(previous) = self.loops.insert(id, sink) {
                previous.stop();
            }
        } else {
            sink.detach();
        }
        Ok(())
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> SoundId {
        self.clips.load(path)
    }

    fn play(&mut self, id: SoundId, looped: bool) {
        if let Err(e) = self.start(id, looped) {
            warn!("Cannot play sound {}: {}", id, e);
        }
    }

    fn stop(&mut self, id: SoundId) {
        if let Some(sink) = self.loops.remove(&id) {
            sink.stop();
        }
    }

    fn set_volume(&mut self, id: SoundId, volume: f32) {
        self.volumes.insert(id, volume);
        if let Some(sink) = self.loops.get(&id) {
            sink.set_volume(volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    /// Mono 16-bit PCM at 8 kHz.
    fn wav(samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8000u32.to_le_bytes());
        out.extend_from_slice(&16000u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }

    #[test]
    fn unreadable_file_keeps_its_slot() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("pop.wav");
        std::fs::write(&present, wav(&[1, 2, 3])).unwrap();

        let mut clips = ClipStore::new();
        let missing = clips.load(&dir.path().join("missing.wav"));
        let found = clips.load(&present);

        assert_eq!((missing, found), (0, 1));
        assert!(clips.get(missing).is_none());
        assert_eq!(clips.get(found).map(|clip| clip.len()), Some(50));
        assert!(clips.get(7).is_none());
    }

    #[test]
    fn one_shot_ends_and_loop_repeats() {
        let clip: Arc<[u8]> = Arc::from(wav(&[100, -100, 200, -200]));

        let once: Vec<i16> = decode(clip.clone(), false).unwrap().collect();
        assert_eq!(once, vec![100, -100, 200, -200]);

        let looped: Vec<i16> = decode(clip, true).unwrap().take(10).collect();
        assert_eq!(looped.len(), 10);
        assert_eq!(&looped[4..8], &[100, -100, 200, -200]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let clip: Arc<[u8]> = Arc::from(vec![0u8; 64]);
        assert!(matches!(decode(clip, false), Err(GameError::AudioDecode(_))));
    }
}
