//! Worker loop that pulls approval events off the bus and drives the consumer.
//!
//! Acknowledgment is modeled through [`Disposition`]:
//! - `Ack` drops the message,
//! - `Retry` re-publishes it with a fresh transport id (broker redelivery),
//! - `DeadLetter` parks it in the sink.
//!
//! Redelivery backoff/bounding is the real broker's concern; the in-memory
//! loop applies only a short pause so an outage does not spin the CPU.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use underwrite_messaging::{DeadLetterSink, EventBus, MessageEnvelope, Subscription};

use crate::consumer::Disposition;

const RETRY_PAUSE: Duration = Duration::from_millis(10);

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Generic consumer worker loop.
///
/// Multiple workers may run against the same bus; the contract store's unique
/// constraint keeps concurrent redeliveries from double-creating.
#[derive(Debug)]
pub struct ConsumerWorker;

impl ConsumerWorker {
    /// Spawn a worker thread that processes envelopes from a bus subscription.
    ///
    /// `handler` must be idempotent (at-least-once delivery safe).
    pub fn spawn<B, D, H>(
        name: &'static str,
        bus: B,
        dead_letters: Arc<D>,
        handler: H,
    ) -> WorkerHandle
    where
        B: EventBus<MessageEnvelope> + Send + Sync + 'static,
        D: DeadLetterSink + 'static,
        H: Fn(&MessageEnvelope) -> Disposition + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub: Subscription<MessageEnvelope> = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, bus, dead_letters, handler))
            .expect("failed to spawn consumer worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn worker_loop<B, D, H>(
    name: &'static str,
    sub: Subscription<MessageEnvelope>,
    shutdown_rx: mpsc::Receiver<()>,
    bus: B,
    dead_letters: Arc<D>,
    handler: H,
) where
    B: EventBus<MessageEnvelope>,
    D: DeadLetterSink,
    H: Fn(&MessageEnvelope) -> Disposition,
{
    let tick = Duration::from_millis(250);

    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(envelope) => match handler(&envelope) {
                Disposition::Ack => {}
                Disposition::Retry => {
                    thread::sleep(RETRY_PAUSE);
                    if let Err(err) = bus.publish(envelope.redelivery()) {
                        warn!(worker = name, error = ?err, "redelivery publish failed");
                    }
                }
                Disposition::DeadLetter(reason) => {
                    dead_letters.park(envelope, reason);
                }
            },
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
