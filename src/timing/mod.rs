//! Animation pacing buckets and hybrid narration timing.

pub mod model;
