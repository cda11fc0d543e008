//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Light and dark palettes
//! - `tabs`: Search and Favorites tab content

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
