use std::fmt;

/// Monotonically increasing 0-based position of an event within its
/// producer's trace.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct StepIndex(pub u64);

/// Structured act/shot/beat position, carried by fatal runtime errors so an
/// authoring mistake can be pinpointed without reading engine code.
///
/// Indices are 0-based positions in the storyboard, not titles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatAddress {
    /// Act index within the storyboard.
    pub act: usize,
    /// Shot index within the act.
    pub shot: usize,
    /// Beat index within the shot.
    pub beat: usize,
}

impl fmt::Display for BeatAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "act {} / shot {} / beat {}",
            self.act, self.shot, self.beat
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
