//! Blocking request/response plumbing for external services.
//!
//! Normal estimation and actuation are both modelled as synchronous calls
//! with an explicit deadline. A call that misses its deadline reports
//! [`ServiceError::Timeout`]; what a timeout means for the cycle is decided
//! by the caller.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("service '{service}' timed out after {timeout:?}")]
    Timeout { service: String, timeout: Duration },

    #[error("service '{service}' unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("service '{service}' failed: {reason}")]
    Failed { service: String, reason: String },
}

impl ServiceError {
    pub fn failed(service: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(service: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Run `call` on a worker thread and wait at most `timeout` for its answer.
///
/// On timeout the worker is left to finish on its own; its result is discarded.
pub fn call_with_timeout<T, F>(service: &str, timeout: Duration, call: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);

    thread::Builder::new()
        .name(format!("svc-{}", service))
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|e| ServiceError::unavailable(service, e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!("service '{}' did not answer within {:?}", service, timeout);
            Err(ServiceError::Timeout {
                service: service.to_string(),
                timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(ServiceError::failed(service, "worker exited without a response"))
        }
    }
}
