//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names, visibility, clicks)
//! - Wall-clock dates for highscore records

pub mod input;
pub mod time;

pub use input::InputAction;
pub use time::today;
