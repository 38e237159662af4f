//! Submission lifecycle controller.
//!
//! Owns the Idle -> Submitting -> (Success | Failed) -> Idle state machine
//! and emits events for presentation layers. The central invariant: identity
//! disclosure is gated on render success, and any failure purges the stored
//! identity, so a visible job badge always matches a currently-displayed,
//! successfully-rendered result.

use crate::client::Backend;
use crate::model::{InfoEvent, SubmitConfig, SubmitEvent};
use crate::orchestrator::post_process;
use crate::ready::ReadyGate;
use crate::store::StateStore;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by presentation layers to drive submissions.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// Submit the given form field set.
    Submit(Vec<(String, String)>),
    Quit,
}

pub(crate) async fn run_controller<B: Backend>(
    cfg: SubmitConfig,
    backend: Arc<B>,
    store: Arc<dyn StateStore>,
    gate: ReadyGate,
    restore_cache: bool,
    event_tx: UnboundedSender<SubmitEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    if restore_cache {
        if let Some(payload) = store.load_last_result() {
            // A cached result renders once the renderer is up, but its job
            // identity is never restored: the badge stays tied to a live
            // submission cycle.
            let tx = event_tx.clone();
            tokio::spawn(gate.clone().when_ready(cfg.ready_timeout, move || {
                tx.send(SubmitEvent::ResultReady {
                    payload: Box::new(payload),
                    job: None,
                })
                .map_err(|_| anyhow!("presentation layer is gone"))
            }));
        }
    }

    // Explicit in-flight handle: a second Submit while one is running is
    // rejected deterministically, independent of any disabled control.
    let mut in_flight: Option<tokio::task::JoinHandle<()>> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(fields)) => {
                        if in_flight.is_some() {
                            log::warn!("submission already in flight; rejecting");
                            let _ = event_tx.send(SubmitEvent::Info(InfoEvent::SubmissionInFlight));
                            continue;
                        }
                        let _ = event_tx.send(SubmitEvent::SubmissionStarted);
                        // Entry purge: a new cycle never inherits an identity.
                        store.clear_job();
                        in_flight = Some(tokio::spawn(run_submission(
                            backend.clone(),
                            store.clone(),
                            gate.clone(),
                            cfg.ready_timeout,
                            event_tx.clone(),
                            fields,
                        )));
                    }
                    // There is no cancellation of an in-flight submission;
                    // quitting simply stops observing it.
                    Some(UiCommand::Quit) | None => break,
                }
            }
            // Hold the JoinHandle through the select so completion is always
            // observed, whichever branch wins first.
            done = async {
                match in_flight.as_mut() {
                    Some(handle) => handle.await,
                    None => futures::future::pending().await,
                }
            } => {
                in_flight = None;
                if let Err(e) = done {
                    log::error!("submission task failed: {e}");
                }
                // Exit actions run unconditionally for both outcomes.
                let _ = event_tx.send(SubmitEvent::SubmissionFinished);
            }
        }
    }

    Ok(())
}

/// One submission cycle. The identity request is issued before the form POST,
/// but its outcome is held undisclosed until the render action runs; the two
/// responses may arrive in either order.
async fn run_submission<B: Backend>(
    backend: Arc<B>,
    store: Arc<dyn StateStore>,
    gate: ReadyGate,
    ready_timeout: Duration,
    event_tx: UnboundedSender<SubmitEvent>,
    fields: Vec<(String, String)>,
) {
    let job = backend.create_job().await;
    if let Some(job) = job.as_ref() {
        store.set_job(job.clone());
    }

    match backend.submit(fields).await {
        Ok(payload) => {
            match post_process::cache_result(store.as_ref(), &payload) {
                Ok(Some(path)) => {
                    let _ = event_tx.send(SubmitEvent::Info(InfoEvent::CacheSaved { path }));
                }
                Ok(None) => {}
                Err(e) => log::warn!("failed to cache result: {e:#}"),
            }
            // Rendering waits for the gate on its own task so the exit
            // actions are not delayed by a slow renderer.
            let tx = event_tx.clone();
            tokio::spawn(gate.when_ready(ready_timeout, move || {
                tx.send(SubmitEvent::ResultReady {
                    payload: Box::new(payload),
                    job,
                })
                .map_err(|_| anyhow!("presentation layer is gone"))
            }));
        }
        Err(e) => {
            log::error!("submission failed: {e:#}");
            // Failure leaves the badge hidden and the identity purged, even
            // when the identity fetch itself succeeded.
            store.clear_job();
            let _ = event_tx.send(SubmitEvent::SubmissionFailed {
                message: format!("{e:#}"),
            });
        }
    }
}
