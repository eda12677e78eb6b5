use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};

use crate::tracking::domain::registry::TrackingRegistry;
use crate::upload::domain::event_sink::EventSink;
use crate::upload::infrastructure::http_event_sink::now_ms;

/// Periodic sweep that finalizes idle sessions.
///
/// Runs on its own thread on a fixed period, independent of
/// observation arrival. Each tick evicts sessions idle past the
/// timeout and hands every one synchronously to the sink as a
/// session-closed event (the sink itself is fire-and-forget, so the
/// tick never blocks on the network). Stopping closes the shutdown
/// channel: the in-flight tick completes and no further ticks run.
pub struct EvictionScheduler {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl EvictionScheduler {
    pub fn start(
        registry: Arc<TrackingRegistry>,
        sink: Arc<dyn EventSink>,
        period: Duration,
        idle_timeout_ms: u64,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let handle = std::thread::spawn(move || {
            loop {
                // Disconnection of the shutdown channel ends the loop;
                // a timeout is just the next tick.
                match shutdown_rx.recv_timeout(period) {
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                    _ => break,
                }
                sweep(&registry, sink.as_ref(), now_ms(), idle_timeout_ms);
            }
            log::debug!("eviction scheduler stopped");
        });

        Self {
            shutdown: shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stops ticking and joins the sweep thread.
    pub fn stop(mut self) {
        drop(self.shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("eviction scheduler thread panicked");
            }
        }
    }
}

/// One sweep: evict stale sessions and emit a session-closed event for
/// each. Split out so the tick body is testable without threads.
pub fn sweep(registry: &TrackingRegistry, sink: &dyn EventSink, now: u64, idle_timeout_ms: u64) {
    let evicted = registry.evict_stale(now, idle_timeout_ms);
    if evicted.is_empty() {
        return;
    }
    log::info!("evicting {} idle session(s)", evicted.len());
    for session in &evicted {
        sink.send_session_closed(session);
    }
}
