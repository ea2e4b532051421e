//! Centralized error types for the game.
//!
//! This module defines all error types used throughout the application,
//! providing a consistent error handling approach. Errors here are data
//! and environment failures; misuse of an API by the caller is a bug and
//! panics instead.

use std::io;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
/// It can represent any error that can occur during game operation.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),

    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while decoding embedded asset data.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Malformed asset data in {name}: {reason}")]
    Malformed { name: String, reason: String },
}

/// Platform-specific errors.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[cfg(windows)]
    #[error("Console initialization failed: {0}")]
    ConsoleInit(String),

    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

/// Errors related to texture operations.
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadFailed(String),

    #[error("Texture not found in atlas: {0}")]
    AtlasTileNotFound(String),

    #[error("Invalid texture format: {0}")]
    InvalidFormat(String),

    #[error("Rendering failed: {0}")]
    RenderFailed(String),
}

/// Errors produced by animation clip and controller data.
#[derive(thiserror::Error, Debug)]
pub enum AnimationError {
    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    #[error("Unknown controller: {0}")]
    UnknownController(String),

    #[error("Controller {controller} rule targets missing state {target}")]
    UnknownRuleTarget { controller: String, target: String },

    #[error("Clip {0} has a non-positive duration")]
    InvalidDuration(String),

    #[error("Controller {controller} transitions did not settle after {steps} steps")]
    TransitionOverflow { controller: String, steps: usize },
}

/// Errors related to audio playback.
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("Failed to load sound: {0}")]
    LoadFailed(String),

    #[error("Unknown sound: {0}")]
    UnknownSound(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Errors related to entity operations.
#[derive(thiserror::Error, Debug)]
pub enum EntityError {
    #[error("No spawner registered for save key: {0}")]
    UnknownSaveKey(String),

    #[error("Unknown powerup kind: {0}")]
    UnknownPowerup(String),

    #[error("Entity record for {key} is malformed: {reason}")]
    BadRecord { key: String, reason: String },

    #[error("Entity cannot be persisted")]
    NotPersistable,
}

/// Errors related to the state stack.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("State already on stack: {0}")]
    DuplicateState(String),

    #[error("Pop requested on an empty state stack")]
    PopOnEmpty,
}

/// Errors related to saved games and highscores.
#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Save data is corrupted: {0}")]
    Corrupted(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
