pub mod graph;
pub mod path;
pub mod pipeline;
pub mod render;
#[cfg(feature = "async")]
pub mod task;
pub mod template;
pub mod validation;
