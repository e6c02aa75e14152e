//! Pick-and-place actuation boundary.

use crate::command::Command;
use pnp_core::{ServiceError, ServiceResult};
use std::time::Duration;

/// Blocking call into the robot's pick-and-place routine.
///
/// `Ok(true)` means the routine reported success, `Ok(false)` that it ran and
/// reported failure.
pub trait PickPlaceService: Send + Sync {
    fn pick_place(&self, command: &Command, timeout: Duration) -> ServiceResult<bool>;
}

/// Logs each request and reports success without moving anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunActuator;

impl PickPlaceService for DryRunActuator {
    fn pick_place(&self, command: &Command, _timeout: Duration) -> ServiceResult<bool> {
        tracing::info!(
            "pick_place_routine: scene {} object '{}' arm '{}' pick {:?} place {:?}",
            command.scene_id,
            command.object_name,
            command.arm_name,
            command.pick_pose.coords.as_slice(),
            command.place_pose.coords.as_slice()
        );
        Ok(true)
    }
}

/// Stands in for a routine that is not running.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineActuator;

impl PickPlaceService for OfflineActuator {
    fn pick_place(&self, _command: &Command, _timeout: Duration) -> ServiceResult<bool> {
        Err(ServiceError::unavailable(
            "pick_place_routine",
            "no actuation backend configured",
        ))
    }
}

/// Result of one actuation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuationOutcome {
    Succeeded,
    /// The routine ran and reported failure.
    Rejected,
    Failed(ServiceError),
}

impl ActuationOutcome {
    pub fn from_response(response: ServiceResult<bool>) -> Self {
        match response {
            Ok(true) => ActuationOutcome::Succeeded,
            Ok(false) => ActuationOutcome::Rejected,
            Err(e) => ActuationOutcome::Failed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActuationOutcome::Succeeded)
    }
}
