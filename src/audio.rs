//! This module handles the audio playback for the game.
//!
//! Sounds are grouped into named banks; a bank with several chunks plays a
//! random variant each time so repeated effects do not sound mechanical.
//! The simulation thread never touches the mixer, it only emits
//! [`SoundRequest`]s that the render thread drains and plays.

use std::collections::HashMap;

use rand::seq::IndexedRandom;
use sdl2::{
    mixer::{self, Channel, Chunk, InitFlag, LoaderRWops, DEFAULT_FORMAT},
    rwops::RWops,
};
use tracing::warn;

use crate::asset::Asset;
use crate::error::{AudioError, GameError, GameResult};
use crate::platform;

const CHANNEL_COUNT: i32 = 4;
/// Playback volume for a request at volume 1.0 (out of mixer::MAX_VOLUME).
const BASE_VOLUME: f32 = 96.0;

const SOUND_BANKS: [(&str, &[Asset]); 10] = [
    ("laser", &[Asset::Laser1, Asset::Laser2]),
    ("saucer_laser", &[Asset::SaucerLaser]),
    ("explode_big", &[Asset::ExplodeBig1, Asset::ExplodeBig2]),
    ("explode_small", &[Asset::ExplodeSmall1, Asset::ExplodeSmall2]),
    ("thrust", &[Asset::Thrust]),
    ("pickup", &[Asset::Pickup]),
    ("ui_move", &[Asset::UiMove]),
    ("ui_select", &[Asset::UiSelect]),
    ("ship_hit", &[Asset::ShipHit]),
    ("wave", &[Asset::Wave]),
];

/// A request to play a named sound, produced by the simulation thread.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub name: &'static str,
    /// Attenuated volume in 0.0..=1.0.
    pub volume: f32,
    /// Extra repeats; 0 plays once, -1 loops until the channel is reused.
    pub loops: i32,
}

impl SoundRequest {
    pub fn new(name: &'static str, volume: f32) -> Self {
        Self { name, volume, loops: 0 }
    }
}

/// The audio system for the game.
///
/// This struct is responsible for initializing the audio device, loading
/// sounds, and playing them.
pub struct Audio {
    _mixer_context: mixer::Sdl2MixerContext,
    banks: HashMap<&'static str, Vec<Chunk>>,
    muted: bool,
}

impl Audio {
    /// Opens the audio device and decodes every embedded sound.
    pub fn new() -> GameResult<Self> {
        let frequency = 44100;
        let format = DEFAULT_FORMAT;
        let chunk_size = 256;

        mixer::open_audio(frequency, format, 1, chunk_size).map_err(GameError::Sdl)?;
        mixer::allocate_channels(CHANNEL_COUNT);

        // No decoder flags; everything is plain WAV
        let mixer_context = mixer::init(InitFlag::empty()).map_err(GameError::Sdl)?;

        let mut banks = HashMap::new();
        for (name, assets) in SOUND_BANKS {
            let chunks = assets
                .iter()
                .map(|asset| {
                    let rwops = RWops::from_bytes(asset.bytes())
                        .map_err(|e| AudioError::LoadFailed(format!("{name}: {e}")))?;
                    rwops.load_wav().map_err(|e| AudioError::LoadFailed(format!("{name}: {e}")))
                })
                .collect::<Result<Vec<Chunk>, AudioError>>()?;
            banks.insert(name, chunks);
        }

        Ok(Audio {
            _mixer_context: mixer_context,
            banks,
            muted: false,
        })
    }

    /// Plays a random variant from the requested sound's bank.
    ///
    /// All channels being busy is not an error; the request is dropped
    /// with a warning since a stolen channel would sound worse.
    pub fn play(&mut self, request: &SoundRequest) -> GameResult<()> {
        if self.muted {
            return Ok(());
        }

        let chunks = self
            .banks
            .get(request.name)
            .ok_or_else(|| AudioError::UnknownSound(request.name.to_string()))?;
        let chunk = chunks
            .choose(&mut platform::rng())
            .ok_or_else(|| AudioError::UnknownSound(request.name.to_string()))?;

        match Channel::all().play(chunk, request.loops) {
            Ok(channel) => {
                let volume = (request.volume.clamp(0.0, 1.0) * BASE_VOLUME) as i32;
                channel.set_volume(volume);
            }
            Err(e) => {
                warn!(sound = request.name, "Could not play sound: {e}");
            }
        }

        Ok(())
    }

    /// Instantly mute or unmute all channels.
    pub fn set_mute(&mut self, mute: bool) {
        if mute {
            for i in 0..CHANNEL_COUNT {
                Channel(i).set_volume(0);
            }
        }
        self.muted = mute;
    }

    /// Returns `true` if the audio is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}
