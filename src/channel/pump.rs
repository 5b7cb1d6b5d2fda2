use std::sync::mpsc::Sender;

use tokio::{runtime::Runtime, sync::watch};

use super::adapter::{ChannelError, EventStream};
use crate::domain::events::ChannelEvent;

const CHANNEL_PUMP_STARTED: &str = "CHANNEL_PUMP_STARTED";
const CHANNEL_PUMP_STOPPED: &str = "CHANNEL_PUMP_STOPPED";
const CHANNEL_PUMP_FORWARD_FAILED: &str = "CHANNEL_PUMP_FORWARD_FAILED";
const CHANNEL_PUMP_READ_FAILED: &str = "CHANNEL_PUMP_READ_FAILED";

/// Forwards channel events from the transport into the engine's queue.
///
/// The pump never buffers, reorders, or de-duplicates: every event the
/// transport yields is forwarded as-is, in arrival order. Dropping the pump
/// signals the forwarding task to stop.
#[derive(Debug)]
pub struct ChannelPump {
    stop_tx: Option<watch::Sender<bool>>,
}

impl ChannelPump {
    pub fn start<S>(runtime: &Runtime, stream: S, event_tx: Sender<ChannelEvent>) -> Self
    where
        S: EventStream + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        runtime.spawn(run_pump(stream, event_tx, stop_rx));

        tracing::info!(code = CHANNEL_PUMP_STARTED, "channel pump started");

        Self {
            stop_tx: Some(stop_tx),
        }
    }

    #[cfg(test)]
    pub fn inert() -> Self {
        Self { stop_tx: None }
    }
}

impl Drop for ChannelPump {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

async fn run_pump<S>(mut stream: S, event_tx: Sender<ChannelEvent>, mut stop_rx: watch::Receiver<bool>)
where
    S: EventStream,
{
    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    tracing::info!(code = CHANNEL_PUMP_STOPPED, "channel pump stopped");
                    return;
                }
            }
            event = stream.next_event() => {
                match event {
                    Ok(event) => {
                        if let Err(error) = event_tx.send(event) {
                            tracing::warn!(
                                code = CHANNEL_PUMP_FORWARD_FAILED,
                                error = %error,
                                "engine queue is gone, stopping channel pump"
                            );
                            return;
                        }
                    }
                    Err(ChannelError::Closed) => {
                        tracing::info!(
                            code = CHANNEL_PUMP_STOPPED,
                            "transport closed, stopping channel pump"
                        );
                        let _ = event_tx.send(ChannelEvent::Disconnected);
                        return;
                    }
                    Err(error) => {
                        tracing::warn!(
                            code = CHANNEL_PUMP_READ_FAILED,
                            error = %error,
                            "channel read failed; keeping pump alive"
                        );
                    }
                }
            }
        }
    }
}
