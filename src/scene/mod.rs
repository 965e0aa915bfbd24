//! Scene configuration, the widget contract, and event dispatch.

pub mod engine;
pub mod model;
pub mod widget;

pub(crate) mod validate;
