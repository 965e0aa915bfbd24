//! Narration backend traits and fixed-rate timing.

use crate::foundation::error::ScenecastResult;

/// A synthesized narration clip scoped to one beat.
///
/// The clip is acquired before the beat runs and released when the box is
/// dropped, on every exit path, including early failure. Duration is
/// available as soon as the handle exists.
pub trait NarrationClip {
    /// Measured duration of the synthesized speech in seconds.
    fn duration_secs(&self) -> f64;
}

/// Text-to-speech boundary.
///
/// When the director runs with no backend configured, narration is disabled
/// and hybrid timing degenerates to the animation base duration.
pub trait NarrationBackend {
    /// Synthesize `text` and return a scoped clip handle.
    fn synthesize(
        &mut self,
        text: &str,
        language: &str,
        voice: &str,
    ) -> ScenecastResult<Box<dyn NarrationClip>>;
}

/// Deterministic duration estimator: no audio, just word count over a fixed
/// speaking rate. The default rate is 160 words per minute.
///
/// Useful for offline timing passes and as a test double, since the same
/// text always yields the same duration.
#[derive(Debug, Clone)]
pub struct FixedRateNarration {
    words_per_min: f64,
}

impl FixedRateNarration {
    /// Estimator with the given speaking rate.
    pub fn new(words_per_min: f64) -> Self {
        Self { words_per_min }
    }
}

impl Default for FixedRateNarration {
    fn default() -> Self {
        Self::new(160.0)
    }
}

struct EstimatedClip {
    duration_secs: f64,
}

impl NarrationClip for EstimatedClip {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

impl NarrationBackend for FixedRateNarration {
    fn synthesize(
        &mut self,
        text: &str,
        _language: &str,
        _voice: &str,
    ) -> ScenecastResult<Box<dyn NarrationClip>> {
        let words = text.split_whitespace().count().max(1);
        let duration_secs = words as f64 * 60.0 / self.words_per_min.max(1.0);
        tracing::debug!(words, duration_secs, "estimated narration duration");
        Ok(Box::new(EstimatedClip { duration_secs }))
    }
}
