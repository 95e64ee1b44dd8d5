use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::ledger::store::RoomStore;

use super::dispatcher::NotificationDispatcher;
use super::gateway::{MessageGateway, RecipientDirectory};

/// Drives the dispatcher on a fixed period.
///
/// `start` is idempotent and fires one pass immediately before arming the
/// timer. `stop` only prevents future passes: dispatch work runs on a
/// blocking task, which task cancellation does not interrupt, so an
/// in-flight pass always completes. Scheduled passes never overlap — the
/// loop waits for the previous pass before taking the next tick.
pub struct Scheduler<S, D, G> {
    dispatcher: Arc<NotificationDispatcher<S, D, G>>,
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
}

impl<S, D, G> Scheduler<S, D, G>
where
    S: RoomStore + 'static,
    D: RecipientDirectory + 'static,
    G: MessageGateway + 'static,
{
    pub fn new(dispatcher: Arc<NotificationDispatcher<S, D, G>>, period: Duration) -> Self {
        Self {
            dispatcher,
            period,
            handle: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Arm the repeating timer. Returns false when already running.
    pub fn start(&self) -> bool {
        let mut guard = self.handle.lock().expect("scheduler mutex poisoned");
        if guard.is_some() {
            return false;
        }

        let dispatcher = self.dispatcher.clone();
        let running = self.running.clone();
        let period = self.period;

        running.store(true, Ordering::Release);
        info!(period_secs = period.as_secs(), "notification scheduler started");

        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // The first tick fires immediately.
                ticker.tick().await;
                let dispatcher = dispatcher.clone();
                match tokio::task::spawn_blocking(move || dispatcher.run()).await {
                    Ok(Ok(result)) => {
                        info!(sent = result.sent, failed = result.failed, "scheduled pass done");
                    }
                    Ok(Err(err)) => {
                        // Listing rooms failed; the next tick retries.
                        warn!(error = %err, "scheduled pass aborted");
                    }
                    Err(err) => {
                        warn!(error = %err, "scheduled pass panicked");
                    }
                }
            }
        }));
        true
    }

    /// Cancel future passes. Returns false when nothing was armed.
    pub fn stop(&self) -> bool {
        let mut guard = self.handle.lock().expect("scheduler mutex poisoned");
        match guard.take() {
            Some(handle) => {
                handle.abort();
                self.running.store(false, Ordering::Release);
                info!("notification scheduler stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl<S, D, G> Drop for Scheduler<S, D, G> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.handle.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}
