pub mod animation;
pub mod sprite;
pub mod sprites;
pub mod text;
