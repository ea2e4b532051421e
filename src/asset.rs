//! Embedded assets and the game data tables parsed from them.
//!
//! Everything the game reads at runtime is compiled into the binary:
//! the atlas image, the sounds, and the JSON data files describing
//! animation clips and controllers. `build.rs` turns the atlas metadata
//! into the `ATLAS_FRAMES` map included below.

include!(concat!(env!("OUT_DIR"), "/atlas_data.rs"));

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AnimationError, AssetError, GameResult, TextureError};
use crate::texture::animation::{AnimController, AnimState, Animation, Frame};
use crate::texture::sprite::{AtlasMapper, AtlasTile};

/// Identifiers for every file embedded in the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    AtlasImage,
    Animations,
    Controllers,
    Laser1,
    Laser2,
    SaucerLaser,
    ExplodeBig1,
    ExplodeBig2,
    ExplodeSmall1,
    ExplodeSmall2,
    Thrust,
    Pickup,
    UiMove,
    UiSelect,
    ShipHit,
    Wave,
}

impl Asset {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Asset::AtlasImage => include_bytes!("../assets/game/atlas.png"),
            Asset::Animations => include_bytes!("../assets/game/data/animations.json"),
            Asset::Controllers => include_bytes!("../assets/game/data/controllers.json"),
            Asset::Laser1 => include_bytes!("../assets/game/sound/laser_1.wav"),
            Asset::Laser2 => include_bytes!("../assets/game/sound/laser_2.wav"),
            Asset::SaucerLaser => include_bytes!("../assets/game/sound/saucer_laser.wav"),
            Asset::ExplodeBig1 => include_bytes!("../assets/game/sound/explode_big_1.wav"),
            Asset::ExplodeBig2 => include_bytes!("../assets/game/sound/explode_big_2.wav"),
            Asset::ExplodeSmall1 => include_bytes!("../assets/game/sound/explode_small_1.wav"),
            Asset::ExplodeSmall2 => include_bytes!("../assets/game/sound/explode_small_2.wav"),
            Asset::Thrust => include_bytes!("../assets/game/sound/thrust.wav"),
            Asset::Pickup => include_bytes!("../assets/game/sound/pickup.wav"),
            Asset::UiMove => include_bytes!("../assets/game/sound/ui_move.wav"),
            Asset::UiSelect => include_bytes!("../assets/game/sound/ui_select.wav"),
            Asset::ShipHit => include_bytes!("../assets/game/sound/ship_hit.wav"),
            Asset::Wave => include_bytes!("../assets/game/sound/wave.wav"),
        }
    }
}

/// Looks up a tile by its atlas name.
///
/// Unlike `SpriteAtlas::get_tile` this does not need the texture, so the
/// simulation thread can resolve tiles without touching SDL.
pub fn tile(name: &str) -> GameResult<AtlasTile> {
    let frame = ATLAS_FRAMES
        .get(name)
        .ok_or_else(|| TextureError::AtlasTileNotFound(name.to_string()))?;
    Ok(AtlasTile::from(*frame))
}

/// The generated atlas table as the runtime mapper the atlas wants.
pub fn atlas_mapper() -> AtlasMapper {
    AtlasMapper {
        frames: ATLAS_FRAMES.into_iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

#[derive(Debug, Deserialize)]
struct AnimationsFile {
    clips: HashMap<String, ClipDef>,
}

/// A clip as written in `animations.json`: either an explicit keyframe
/// timeline or a fixed-rate flipbook.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClipDef {
    Timeline {
        timeline: Vec<FrameDef>,
        duration: f32,
        looping: bool,
    },
    Flipbook {
        tiles: Vec<String>,
        frame_ticks: f32,
        looping: bool,
    },
}

#[derive(Debug, Deserialize)]
struct FrameDef {
    at: f32,
    tile: String,
}

#[derive(Debug, Deserialize)]
struct ControllersFile {
    controllers: HashMap<String, ControllerDef>,
}

#[derive(Debug, Deserialize)]
struct ControllerDef {
    start: String,
    states: HashMap<String, AnimState>,
}

/// Animation clips and controller definitions parsed from the embedded
/// data files, shared read-only across states and threads.
pub struct GameData {
    clips: HashMap<String, Animation>,
    controllers: HashMap<String, ControllerDef>,
}

impl GameData {
    /// Parses and validates the embedded data files.
    ///
    /// All cross-references (clip tiles, controller clips, rule targets)
    /// are checked here so later lookups cannot fail on bad data.
    pub fn load() -> GameResult<Self> {
        let animations: AnimationsFile = parse_json("animations.json", Asset::Animations.bytes())?;
        let mut clips = HashMap::new();
        for (name, def) in animations.clips {
            let clip = match def {
                ClipDef::Timeline {
                    timeline,
                    duration,
                    looping,
                } => {
                    if duration <= 0.0 {
                        return Err(AnimationError::InvalidDuration(name).into());
                    }
                    let frames = timeline
                        .into_iter()
                        .map(|frame| {
                            Ok(Frame {
                                at: frame.at,
                                tile: tile(&frame.tile)?,
                            })
                        })
                        .collect::<GameResult<Vec<_>>>()?;
                    Animation::new(frames, duration, looping)
                }
                ClipDef::Flipbook {
                    tiles,
                    frame_ticks,
                    looping,
                } => {
                    if frame_ticks <= 0.0 || tiles.is_empty() {
                        return Err(AnimationError::InvalidDuration(name).into());
                    }
                    let tiles = tiles.iter().map(|tile_name| tile(tile_name)).collect::<GameResult<Vec<_>>>()?;
                    Animation::flipbook(tiles, frame_ticks, looping)
                }
            };
            clips.insert(name, clip);
        }

        let controllers: ControllersFile = parse_json("controllers.json", Asset::Controllers.bytes())?;
        for (name, def) in &controllers.controllers {
            if !def.states.contains_key(&def.start) {
                return Err(AnimationError::UnknownRuleTarget {
                    controller: name.clone(),
                    target: def.start.clone(),
                }
                .into());
            }
            for state in def.states.values() {
                for clip_name in &state.clips {
                    if !clips.contains_key(clip_name) {
                        return Err(AnimationError::UnknownClip(clip_name.clone()).into());
                    }
                }
                for rule in &state.rules {
                    if !def.states.contains_key(&rule.to) {
                        return Err(AnimationError::UnknownRuleTarget {
                            controller: name.clone(),
                            target: rule.to.clone(),
                        }
                        .into());
                    }
                }
            }
        }

        debug!(
            clips = clips.len(),
            controllers = controllers.controllers.len(),
            "Loaded animation data"
        );

        Ok(Self {
            clips,
            controllers: controllers.controllers,
        })
    }

    /// Returns a fresh instance of the named clip, rewound to the start.
    pub fn clip(&self, name: &str) -> GameResult<Animation> {
        let mut clip = self
            .clips
            .get(name)
            .cloned()
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;
        clip.restart();
        Ok(clip)
    }

    /// Builds a fresh controller instance from the named definition.
    pub fn controller(&self, name: &str) -> GameResult<AnimController> {
        let def = self
            .controllers
            .get(name)
            .ok_or_else(|| AnimationError::UnknownController(name.to_string()))?;

        let mut clips = HashMap::new();
        for state in def.states.values() {
            for clip_name in &state.clips {
                if !clips.contains_key(clip_name) {
                    clips.insert(clip_name.clone(), self.clip(clip_name)?);
                }
            }
        }

        Ok(AnimController::new(name, def.states.clone(), clips, &def.start))
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(name: &str, bytes: &[u8]) -> GameResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        AssetError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
