//! Path-reporting validation machinery shared by the storyboard and scene
//! configuration validators.

pub(crate) mod path;
