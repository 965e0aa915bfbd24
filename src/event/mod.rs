//! Event contract between external algorithm adapters and the scene engine.

pub mod model;
pub mod source;
