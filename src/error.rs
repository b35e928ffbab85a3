//! Error type for configuration and startup failures.
//!
//! Per-frame anomalies (empty detections, infeasible associations) are not
//! errors and never surface here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON or has the wrong shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A zone polygon has fewer than three vertices.
    #[error("zone `{zone}` has {points} point(s), a polygon needs at least 3")]
    DegeneratePolygon { zone: String, points: usize },

    /// A zone entry could not be parsed (missing points, non-integer coordinates, ...).
    #[error("zone `{zone}` is malformed: {reason}")]
    MalformedZone { zone: String, reason: String },

    /// The zone file parsed but defines no zones.
    #[error("zone configuration defines no zones")]
    NoZones,

    /// The requested category is not in the category table.
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    /// A tunable is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
