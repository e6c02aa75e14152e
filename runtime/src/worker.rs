//! Dedicated perception thread.

use crate::pipeline::PerceptionPipeline;
use crate::slot::FrameSlot;
use pnp_core::PointCloud;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Owns the thread that runs [`PerceptionPipeline::serve`].
pub struct PerceptionWorker {
    slot: Arc<FrameSlot>,
    handle: JoinHandle<PerceptionPipeline>,
}

impl PerceptionWorker {
    pub fn spawn(mut pipeline: PerceptionPipeline) -> std::io::Result<Self> {
        let slot = Arc::new(FrameSlot::new());
        let worker_slot = Arc::clone(&slot);
        let handle = thread::Builder::new()
            .name("pnp-perception".to_string())
            .spawn(move || {
                pipeline.serve(&worker_slot);
                pipeline
            })?;
        Ok(Self { slot, handle })
    }

    /// Hand a frame to the worker. Returns `false` if it was dropped.
    pub fn offer(&self, frame: PointCloud) -> bool {
        self.slot.offer(frame)
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }

    /// Close the slot, let the worker drain it, and get the pipeline back.
    pub fn shutdown(self) -> thread::Result<PerceptionPipeline> {
        self.slot.close();
        self.handle.join()
    }
}
