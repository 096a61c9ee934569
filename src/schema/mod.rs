//! The vocabulary the engine operates on: authored entities, generation
//! options, and the story graph the engine produces.

pub mod character;
pub mod event;
pub mod genre;
pub mod id;
pub mod options;
pub mod plot;
pub mod setting;
pub mod story;
