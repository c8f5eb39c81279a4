//! Deterministic replay recording for Funfair sessions.
//!
//! Records the executed actions and post-tick checksums of a running
//! session so it can be re-run later, bit-for-bit, from the same seed.
//! Used for desync debugging, regression capture, and determinism
//! verification.
//!
//! # Architecture
//!
//! - [`ReplayRecorder`] observes a live session and streams frames to
//!   any `Write` sink
//! - [`ReplayReader`] plays frames back from any `Read` source
//! - [`replay_and_compare`] re-runs a recording through a caller's
//!   step function and reports the first divergence
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "FFRP"] [VERSION u16] [ReplayHeader]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```
//!
//! Each frame carries the tick ID, the actions that executed in that
//! tick, and the post-tick state checksum (0 when the tick is exempt
//! from checksum comparison).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod reader;
pub mod recorder;
pub mod types;

pub use compare::{first_divergence, replay_and_compare, Divergence};
pub use error::ReplayError;
pub use reader::{FrameIter, ReplayReader};
pub use recorder::ReplayRecorder;
pub use types::{Frame, ReplayHeader};

/// Magic bytes at the start of every replay file.
pub const MAGIC: [u8; 4] = *b"FFRP";

/// Current binary format version. Bumped whenever the tick rate, the
/// frame layout, or any wire tag changes meaning.
pub const FORMAT_VERSION: u16 = 1;
