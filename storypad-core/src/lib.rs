//! Core state of the storypad client: the sketch surface and its undo history, the quiz player,
//! and the data exchanged with the story service.
#![warn(clippy::pedantic)]

pub mod canvas;
pub mod color;
pub mod drawing;
pub mod history;
pub mod quiz;
pub mod story;

pub use color::Color;
