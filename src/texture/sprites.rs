//! A structured representation of all sprite assets in the game.
//!
//! This module provides a set of enums to represent every sprite, allowing for
//! type-safe access to asset paths and avoiding the use of raw strings.
//! The `GameSprite` enum is the main entry point, and its `to_path` method
//! generates the correct path for a given sprite in the texture atlas.

use crate::entity::asteroid::AsteroidSize;
use crate::entity::powerup::PowerupKind;

/// Represents the different sprites for the player ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipSprite {
    /// The ship hull with engines off.
    Hull,
    /// The exhaust flame for a given animation frame, drawn over the hull.
    Flame(u8),
    /// A frame of the ship breaking apart.
    Death(u8),
    /// The shield bubble drawn around the hull while shielded.
    Shield,
}

/// Represents the different sprites for asteroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RockSprite {
    /// An intact, drifting asteroid of the given size.
    Drift(AsteroidSize),
    /// A frame of an asteroid breaking apart.
    Break(AsteroidSize, u8),
}

/// Represents the different sprites for the saucer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaucerSprite {
    /// The saucer with its lights in a given animation frame.
    Patrol(u8),
    /// A frame of the saucer being destroyed.
    Death(u8),
}

/// Represents the projectile sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulletSprite {
    Player,
    Saucer,
}

/// Represents the one-shot effect sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxSprite {
    Explosion(u8),
    Spark(u8),
}

/// Represents the background starfield sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarSprite {
    Dim,
    Bright,
}

/// A top-level enum that encompasses all game sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSprite {
    Ship(ShipSprite),
    Rock(RockSprite),
    Saucer(SaucerSprite),
    Bullet(BulletSprite),
    /// A powerup pickup of the given kind, pulsing between two frames.
    Powerup(PowerupKind, u8),
    Fx(FxSprite),
    Star(StarSprite),
    HudLife,
}

impl GameSprite {
    /// Generates the asset path for the sprite.
    ///
    /// This path corresponds to the filename in the texture atlas JSON file.
    pub fn to_path(self) -> String {
        match self {
            GameSprite::Ship(sprite) => match sprite {
                ShipSprite::Hull => "ship/hull.png".to_string(),
                ShipSprite::Flame(frame) => format!("ship/flame_{}.png", frame_char(frame)),
                ShipSprite::Death(frame) => {
                    assert!(frame < 4, "Invalid animation frame");
                    format!("ship/death_{}.png", frame)
                }
                ShipSprite::Shield => "ship/shield.png".to_string(),
            },
            GameSprite::Rock(sprite) => match sprite {
                RockSprite::Drift(size) => format!("rock/{}_drift.png", size.as_ref()),
                RockSprite::Break(size, frame) => {
                    assert!(frame < 3, "Invalid animation frame");
                    format!("rock/{}_break_{}.png", size.as_ref(), frame)
                }
            },
            GameSprite::Saucer(sprite) => match sprite {
                SaucerSprite::Patrol(frame) => format!("saucer/patrol_{}.png", frame_char(frame)),
                SaucerSprite::Death(frame) => {
                    assert!(frame < 3, "Invalid animation frame");
                    format!("saucer/death_{}.png", frame)
                }
            },
            GameSprite::Bullet(sprite) => match sprite {
                BulletSprite::Player => "bullet/player.png".to_string(),
                BulletSprite::Saucer => "bullet/saucer.png".to_string(),
            },
            GameSprite::Powerup(kind, frame) => {
                let stem = match kind {
                    PowerupKind::RapidFire => "rapid",
                    PowerupKind::Shield => "shield",
                    PowerupKind::ExtraLife => "life",
                };
                format!("powerup/{}_{}.png", stem, frame_char(frame))
            }
            GameSprite::Fx(sprite) => match sprite {
                FxSprite::Explosion(frame) => {
                    assert!(frame < 4, "Invalid animation frame");
                    format!("fx/explosion_{}.png", frame)
                }
                FxSprite::Spark(frame) => {
                    assert!(frame < 3, "Invalid animation frame");
                    format!("fx/spark_{}.png", frame)
                }
            },
            GameSprite::Star(sprite) => match sprite {
                StarSprite::Dim => "star/dim.png".to_string(),
                StarSprite::Bright => "star/bright.png".to_string(),
            },
            GameSprite::HudLife => "hud/life.png".to_string(),
        }
    }
}

fn frame_char(frame: u8) -> char {
    match frame {
        0 => 'a',
        1 => 'b',
        _ => panic!("Invalid animation frame"),
    }
}
