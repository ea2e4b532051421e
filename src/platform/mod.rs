//! Platform abstraction layer for desktop-specific functionality.

mod desktop;
pub use desktop::*;
