use std::io;
use thiserror::Error;

pub type FusionResult<T> = Result<T, FusionError>;

/// Which keypoint sequence an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSide {
    Previous,
    Current,
}

impl std::fmt::Display for FrameSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameSide::Previous => write!(f, "previous"),
            FrameSide::Current => write!(f, "current"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FusionError {
    /// A feature match points outside its keypoint sequence. This is upstream
    /// data corruption and is never clamped or skipped.
    #[error("{side} keypoint index {index} out of range (len {len})")]
    KeypointIndexOutOfRange {
        side: FrameSide,
        index: usize,
        len: usize,
    },

    /// Any error raised while processing one frame of a sequence.
    #[error("frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: Box<FusionError>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}
