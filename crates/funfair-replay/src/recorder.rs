//! Replay recording.
//!
//! [`ReplayRecorder`] implements the simulation observer traits, so a
//! scheduler streams frames into it without knowing replays exist. The
//! header is written immediately on construction; one frame is written
//! per completed tick.
//!
//! The observer hooks cannot return errors, so the first write failure
//! latches and recording stops; [`finish`](ReplayRecorder::finish)
//! surfaces it.

use std::io::Write;

use funfair_core::action::{Action, ActionFlags};
use funfair_core::id::TickId;
use funfair_core::result::ActionResult;
use funfair_core::traits::{ActionObserver, TickObserver};

use crate::codec::{encode_frame, encode_header};
use crate::error::ReplayError;
use crate::types::{Frame, ReplayHeader};

/// Streams replay frames to a byte sink.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
pub struct ReplayRecorder<W: Write> {
    writer: W,
    /// Actions executed in the tick currently in flight.
    pending: Vec<Action>,
    frames_written: u64,
    error: Option<ReplayError>,
}

impl<W: Write> ReplayRecorder<W> {
    /// Create a recorder, immediately writing the header.
    pub fn new(mut writer: W, header: &ReplayHeader) -> Result<Self, ReplayError> {
        encode_header(&mut writer, header)?;
        Ok(Self {
            writer,
            pending: Vec::new(),
            frames_written: 0,
            error: None,
        })
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// The latched write error, if recording has failed.
    pub fn error(&self) -> Option<&ReplayError> {
        self.error.as_ref()
    }

    /// Flush and return the sink, or the error that stopped recording.
    pub fn finish(mut self) -> Result<W, ReplayError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ActionObserver for ReplayRecorder<W> {
    fn action_executed(&mut self, _tick: TickId, action: &Action, _result: &ActionResult) {
        if self.error.is_some() {
            return;
        }
        // Local-only actions never replicate, so they never replay
        // either; replaying them would double-apply local UI state.
        let flags = action.kind.flags();
        if flags.contains(ActionFlags::NOT_REPLAYABLE) || flags.contains(ActionFlags::LOCAL_ONLY) {
            return;
        }
        self.pending.push(action.clone());
    }
}

impl<W: Write> TickObserver for ReplayRecorder<W> {
    fn tick_completed(&mut self, tick: TickId, checksum: u64) {
        if self.error.is_some() {
            self.pending.clear();
            return;
        }
        let frame = Frame {
            tick: tick.0,
            actions: std::mem::take(&mut self.pending),
            checksum,
        };
        match encode_frame(&mut self.writer, &frame) {
            Ok(()) => self.frames_written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}
