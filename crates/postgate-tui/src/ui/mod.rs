//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, login form and overlays
//! - `posts`: the post panel
//! - `input`: keyboard event handling
//! - `styles`: colors and text styling

pub mod input;
pub mod posts;
pub mod render;
pub mod styles;
