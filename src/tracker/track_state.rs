use serde::Serialize;

/// Track state enumeration for the identity lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TrackState {
    /// Matched fewer than `n_init` times; a single miss deletes it
    #[default]
    Tentative,
    /// Matched at least `n_init` times and seen on the latest frame
    Confirmed,
    /// Confirmed track that missed the latest frame, still within `max_age`
    Lost,
    /// Pruned; never returned to callers
    Deleted,
}
