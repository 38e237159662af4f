//! Renderer readiness gate.
//!
//! A one-shot signal the renderer fires once it can draw, with a bounded wait
//! on the consuming side. The gate admits an action at most once per wait;
//! on timeout the action never runs and the page of results is simply not
//! shown, which keeps the rest of the application usable.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;

/// Handle the renderer fires exactly once when it is up.
pub struct ReadySignal(watch::Sender<bool>);

impl ReadySignal {
    pub fn ready(&self) {
        let _ = self.0.send(true);
    }
}

/// Admission gate in front of the render pipeline. Cheap to clone; every
/// clone observes the same signal.
#[derive(Clone)]
pub struct ReadyGate {
    rx: watch::Receiver<bool>,
}

impl ReadyGate {
    pub fn channel() -> (ReadySignal, ReadyGate) {
        let (tx, rx) = watch::channel(false);
        (ReadySignal(tx), ReadyGate { rx })
    }

    /// A gate that is already open, for one-shot modes with no renderer
    /// thread to wait on.
    pub fn open() -> ReadyGate {
        let (tx, rx) = watch::channel(true);
        drop(tx);
        ReadyGate { rx }
    }

    /// Run `action` exactly once after the renderer is ready, within
    /// `timeout`. Action failures are logged, never propagated; a timeout
    /// logs a warning and drops the action.
    pub async fn when_ready<F>(mut self, timeout: Duration, action: F)
    where
        F: FnOnce() -> Result<()>,
    {
        match tokio::time::timeout(timeout, self.rx.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => {
                if let Err(e) = action() {
                    log::error!("render failed: {e:#}");
                }
            }
            Ok(Err(_)) => log::warn!("renderer went away before becoming ready"),
            Err(_) => log::warn!(
                "renderer not ready within {}; result not rendered",
                humantime::format_duration(timeout)
            ),
        }
    }
}
