//! Story Engine: procedural story graphs for interactive fiction.
//!
//! Authored characters, settings and plot beats go in; a branching graph
//! of story nodes, one canonical reading path through it, and a rendered
//! markdown narrative come out. All randomness is seeded or injected, so
//! a pinned seed reproduces a story exactly.
//!
//! ```no_run
//! use story_engine::core::pipeline::StoryEngine;
//! use story_engine::state::StoryState;
//!
//! let state: StoryState = Default::default();
//! let mut engine = StoryEngine::builder().seed(42).build()?;
//! match engine.generate(&state) {
//!     Ok(story) => println!("{}", story.text),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # Ok::<(), story_engine::core::pipeline::PipelineError>(())
//! ```

pub mod core;
pub mod schema;
pub mod state;
