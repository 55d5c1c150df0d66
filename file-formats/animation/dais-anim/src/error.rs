use std::io;
use thiserror::Error;

/// Error types for loading, validating and writing animation assets
#[derive(Error, Debug)]
pub enum AnimError {
    /// I/O error while writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The buffer ended before a field could be read
    #[error("Unexpected end of data at offset {offset}: needed {needed} bytes, buffer is {len} bytes")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// A header offset points outside the buffer
    #[error("Invalid {section} offset {offset} (buffer is {len} bytes)")]
    InvalidOffset {
        section: &'static str,
        offset: usize,
        len: usize,
    },

    /// A skeleton must have at least one bone
    #[error("Skeleton has no bones")]
    EmptySkeleton,

    /// A bone's parent does not precede it
    #[error("Bone {bone} has parent {parent}; parents must precede their children")]
    ParentOrder { bone: usize, parent: usize },

    /// A bone ID does not exist in the skeleton
    #[error("Bone ID {bone} out of range for a skeleton of {bone_count} bones")]
    BoneOutOfRange { bone: usize, bone_count: usize },

    /// Two parallel arrays disagree in length
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Keyframe percentages must be non-decreasing
    #[error("Keyframes of bone {bone} {channel} channel are not sorted by percentage")]
    UnsortedKeyframes { bone: u16, channel: &'static str },

    /// Clip time span ends before it starts
    #[error("Invalid time span: start {start}, end {end}")]
    InvalidTimespan { start: f64, end: f64 },

    /// A bone appears twice in one clip
    #[error("Bone {0} is animated more than once")]
    DuplicateBone(u16),

    /// A bone name cannot be stored in the assignment file
    #[error("Invalid bone name: {0:?}")]
    InvalidBoneName(String),

    /// A bone name is missing from the assignment file
    #[error("Unknown bone name: {0:?}")]
    UnknownBoneName(String),

    /// A count does not fit the 16-bit fields of the format
    #[error("Too many {what}: {count} (format limit is 65535)")]
    TooMany { what: &'static str, count: usize },
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
