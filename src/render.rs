//! Shared drawing context handed down through states and entities.

use glam::{IVec2, UVec2, Vec2};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::WindowCanvas;

use crate::constants::CANVAS_SIZE;
use crate::error::{GameResult, TextureError};
use crate::texture::sprite::{AtlasTile, SpriteAtlas};
use crate::texture::text::TextTexture;

/// Builds a rect of `size` centered on `pixel_pos`.
pub fn centered_with_size(pixel_pos: IVec2, size: UVec2) -> Rect {
    // Ensure the position doesn't cause integer overflow when centering
    let x = pixel_pos.x.saturating_sub(size.x as i32 / 2);
    let y = pixel_pos.y.saturating_sub(size.y as i32 / 2);

    Rect::new(x, y, size.x, size.y)
}

/// Everything a draw call needs: the backbuffer canvas, the atlas, the
/// text renderer, and how far the render clock has progressed into the
/// current simulation tick.
///
/// Concrete over `Canvas<Window>` so `GameObject` stays object safe;
/// `with_texture_canvas` hands the same canvas type back while targeting
/// the backbuffer.
pub struct DrawContext<'a> {
    pub canvas: &'a mut WindowCanvas,
    pub atlas: &'a mut SpriteAtlas,
    pub text: &'a mut TextTexture,
    /// Interpolation amount in 0.0..=1.0 for sub-tick smoothing.
    pub lerp: f32,
}

impl DrawContext<'_> {
    /// Draws a tile centered on `center` (in canvas pixels), rotated by
    /// `angle` degrees clockwise.
    pub fn draw_tile(&mut self, tile: AtlasTile, center: Vec2, angle: f64) -> GameResult<()> {
        let dest = centered_with_size(
            IVec2::new(center.x.round() as i32, center.y.round() as i32),
            UVec2::new(tile.size.x as u32, tile.size.y as u32),
        );
        if angle == 0.0 {
            tile.render(self.canvas, self.atlas, dest)?;
        } else {
            tile.render_rotated(self.canvas, self.atlas, dest, angle)?;
        }
        Ok(())
    }

    pub fn draw_text(&mut self, text: &str, position: UVec2) -> GameResult<()> {
        self.draw_text_colored(text, position, Color::WHITE)
    }

    pub fn draw_text_colored(&mut self, text: &str, position: UVec2, color: Color) -> GameResult<()> {
        self.text
            .render_colored(self.canvas, self.atlas, text, position, color)
            .map_err(|e| TextureError::RenderFailed(format!("Failed to render text: {e}")).into())
    }

    /// Draws a line of text horizontally centered on the canvas.
    pub fn draw_text_centered(&mut self, text: &str, y: u32, color: Color) -> GameResult<()> {
        let width = self.text.text_width(text);
        let x = CANVAS_SIZE.x.saturating_sub(width) / 2;
        self.draw_text_colored(text, UVec2::new(x, y), color)
    }
}
