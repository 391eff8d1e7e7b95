//! Error types shared by the engine and the game.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Audio manifest error on line {line}: {message}")]
    AudioManifest { line: usize, message: String },

    #[error("Unknown sound bank: {0}")]
    UnknownSoundBank(String),

    #[error("Failed to open audio output: {0}")]
    AudioOutput(#[from] rodio::StreamError),

    #[error("Failed to start playback: {0}")]
    AudioPlay(#[from] rodio::PlayError),

    #[error("Failed to decode sound: {0}")]
    AudioDecode(#[from] rodio::decoder::DecoderError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("Surface reports no supported {0}")]
    SurfaceCapabilities(&'static str),

    #[error("No compatible graphics adapter found")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, GameError>;
