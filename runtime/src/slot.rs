//! Single-frame hand-off from the sensor callback to the perception worker.
//!
//! At most one frame waits and at most one is in flight. A frame offered
//! while a cycle runs is dropped. A frame offered while another one waits
//! replaces it, so the worker always starts on the newest idle-time frame.

use parking_lot::{Condvar, Mutex};
use pnp_core::PointCloud;
use std::ops::Deref;

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<PointCloud>,
    busy: bool,
    closed: bool,
    dropped: u64,
}

#[derive(Debug, Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a frame. Returns `false` if it was dropped.
    ///
    /// A waiting frame that has not been taken yet is replaced and counted
    /// as dropped.
    pub fn offer(&self, frame: PointCloud) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.busy {
            state.dropped += 1;
            tracing::debug!("Dropping frame of {} points, pipeline busy", frame.len());
            return false;
        }
        if let Some(stale) = state.pending.replace(frame) {
            state.dropped += 1;
            tracing::debug!("Replacing waiting frame of {} points", stale.len());
        }
        self.ready.notify_one();
        true
    }

    /// Block until a frame is available. `None` once the slot is closed and drained.
    ///
    /// The slot stays busy until the returned lease is dropped.
    pub fn take(&self) -> Option<FrameLease<'_>> {
        let mut state = self.state.lock();
        loop {
            if let Some(frame) = state.pending.take() {
                state.busy = true;
                return Some(FrameLease { slot: self, frame });
            }
            if state.closed {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Refuse further frames and wake any waiting worker.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Frames rejected or replaced by [`FrameSlot::offer`] so far.
    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }
}

/// A frame taken from a [`FrameSlot`]; releases the slot on drop.
pub struct FrameLease<'a> {
    slot: &'a FrameSlot,
    frame: PointCloud,
}

impl Deref for FrameLease<'_> {
    type Target = PointCloud;

    fn deref(&self) -> &PointCloud {
        &self.frame
    }
}

impl Drop for FrameLease<'_> {
    fn drop(&mut self) {
        self.slot.state.lock().busy = false;
    }
}
