//! This module provides text rendering using the texture atlas.
//!
//! Glyphs are 8x8 tiles under `text/` in the atlas, rendered one character
//! at a time with an optional scale. Most characters map to their literal
//! name (e.g. "text/A.png"); characters that cannot appear in filenames use
//! alternative names:
//! - `!` → "text/exclamation.png"
//! - `-` → "text/dash.png"
//! - `/` → "text/slash.png"
//! - `:` → "text/colon.png"
//! - `,` → "text/comma.png"
//! - `.` → "text/period.png"
//! - `>` → "text/arrow.png"
//!
//! Lowercase letters fold to uppercase. Unsupported characters (including
//! spaces) render as a gap but still advance the cursor, so layouts hold.
//!
//! Character tiles are cached in a HashMap to avoid repeated atlas lookups;
//! only tiles for used characters are stored.

use anyhow::Result;
use glam::UVec2;

use sdl2::pixels::Color;
use sdl2::render::{Canvas, RenderTarget};
use std::collections::HashMap;

use crate::texture::sprite::{AtlasTile, SpriteAtlas};

/// A text texture that renders characters from the atlas.
pub struct TextTexture {
    char_map: HashMap<char, AtlasTile>,
    scale: f32,
}

impl TextTexture {
    /// Creates a new text texture with the given scale.
    pub fn new(scale: f32) -> Self {
        Self {
            char_map: HashMap::new(),
            scale,
        }
    }

    /// Maps a character to its atlas tile, handling special characters.
    fn get_char_tile(&mut self, atlas: &SpriteAtlas, c: char) -> Option<AtlasTile> {
        if let Some(tile) = self.char_map.get(&c) {
            return Some(*tile);
        }

        let tile_name = self.char_to_tile_name(c)?;
        let tile = atlas.get_tile(&tile_name).ok()?;
        self.char_map.insert(c, tile);
        Some(tile)
    }

    /// Converts a character to its tile name in the atlas.
    fn char_to_tile_name(&self, c: char) -> Option<String> {
        let name = match c {
            'A'..='Z' | '0'..='9' => format!("text/{c}.png"),
            'a'..='z' => format!("text/{}.png", c.to_ascii_uppercase()),
            '!' => "text/exclamation.png".to_string(),
            '-' => "text/dash.png".to_string(),
            '/' => "text/slash.png".to_string(),
            ':' => "text/colon.png".to_string(),
            ',' => "text/comma.png".to_string(),
            '.' => "text/period.png".to_string(),
            '>' => "text/arrow.png".to_string(),
            _ => return None,
        };

        Some(name)
    }

    /// Renders a string of text at the given position.
    pub fn render<C: RenderTarget>(
        &mut self,
        canvas: &mut Canvas<C>,
        atlas: &mut SpriteAtlas,
        text: &str,
        position: UVec2,
    ) -> Result<()> {
        self.render_colored(canvas, atlas, text, position, Color::WHITE)
    }

    /// Renders a string of text modulated with the given color.
    pub fn render_colored<C: RenderTarget>(
        &mut self,
        canvas: &mut Canvas<C>,
        atlas: &mut SpriteAtlas,
        text: &str,
        position: UVec2,
        color: Color,
    ) -> Result<()> {
        let mut x_offset = 0;
        let char_width = (8.0 * self.scale) as u32;
        let char_height = (8.0 * self.scale) as u32;

        for c in text.chars() {
            if let Some(mut tile) = self.get_char_tile(atlas, c) {
                tile.color = Some(color);
                let dest = sdl2::rect::Rect::new((position.x + x_offset) as i32, position.y as i32, char_width, char_height);
                tile.render(canvas, atlas, dest)?;
            }
            // Always advance x_offset for all characters (including spaces)
            x_offset += char_width;
        }

        Ok(())
    }

    /// Sets the scale for text rendering.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Gets the current scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Calculates the width of a string in pixels at the current scale.
    ///
    /// Every character advances the cursor, matching `render`.
    pub fn text_width(&self, text: &str) -> u32 {
        let char_width = (8.0 * self.scale) as u32;
        text.chars().count() as u32 * char_width
    }

    /// Calculates the height of text in pixels at the current scale.
    pub fn text_height(&self) -> u32 {
        (8.0 * self.scale) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_tile_name_letters() {
        let text_texture = TextTexture::new(1.0);

        assert_eq!(text_texture.char_to_tile_name('A'), Some("text/A.png".to_string()));
        assert_eq!(text_texture.char_to_tile_name('Z'), Some("text/Z.png".to_string()));
        // lowercase folds to uppercase
        assert_eq!(text_texture.char_to_tile_name('a'), Some("text/A.png".to_string()));
    }

    #[test]
    fn test_char_to_tile_name_numbers() {
        let text_texture = TextTexture::new(1.0);

        assert_eq!(text_texture.char_to_tile_name('0'), Some("text/0.png".to_string()));
        assert_eq!(text_texture.char_to_tile_name('9'), Some("text/9.png".to_string()));
    }

    #[test]
    fn test_char_to_tile_name_special_characters() {
        let text_texture = TextTexture::new(1.0);

        assert_eq!(text_texture.char_to_tile_name('!'), Some("text/exclamation.png".to_string()));
        assert_eq!(text_texture.char_to_tile_name('-'), Some("text/dash.png".to_string()));
        assert_eq!(text_texture.char_to_tile_name(':'), Some("text/colon.png".to_string()));
        assert_eq!(text_texture.char_to_tile_name('>'), Some("text/arrow.png".to_string()));
    }

    #[test]
    fn test_char_to_tile_name_unsupported() {
        let text_texture = TextTexture::new(1.0);

        assert_eq!(text_texture.char_to_tile_name(' '), None);
        assert_eq!(text_texture.char_to_tile_name('@'), None);
        assert_eq!(text_texture.char_to_tile_name('~'), None);
    }

    #[test]
    fn test_text_width() {
        let text_texture = TextTexture::new(1.0);
        assert_eq!(text_texture.text_width(""), 0);
        assert_eq!(text_texture.text_width("A"), 8);
        assert_eq!(text_texture.text_width("ABC"), 24);
        // spaces advance the cursor and count toward width
        assert_eq!(text_texture.text_width("A B"), 24);
    }

    #[test]
    fn test_text_width_with_scale() {
        let text_texture = TextTexture::new(2.0);
        assert_eq!(text_texture.text_width("A"), 16);
        assert_eq!(text_texture.text_width("ABC"), 48);
    }
}
