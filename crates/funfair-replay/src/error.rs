//! Error types for the replay system.

use std::fmt;
use std::io;

/// Errors that can occur during replay recording, playback, or
/// comparison.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the expected `b"FFRP"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u16,
    },
    /// A frame could not be decoded (truncated or corrupt data).
    MalformedFrame {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An action kind wire tag is not recognized.
    UnknownActionKind {
        /// The unrecognized tag.
        tag: u16,
    },
    /// A parameter value type tag is not recognized.
    UnknownParamType {
        /// The unrecognized tag.
        tag: u8,
    },
    /// The recording's tick rate differs from this build's.
    TickRateMismatch {
        /// Ticks per second from the replay header.
        recorded: u32,
        /// Ticks per second of the current build.
        current: u32,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"FFRP\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedFrame { detail } => write!(f, "malformed frame: {detail}"),
            Self::UnknownActionKind { tag } => {
                write!(f, "unknown action kind tag {tag}")
            }
            Self::UnknownParamType { tag } => {
                write!(f, "unknown parameter type tag {tag}")
            }
            Self::TickRateMismatch { recorded, current } => {
                write!(
                    f,
                    "tick rate mismatch: recorded at {recorded} Hz, this build runs {current} Hz"
                )
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
