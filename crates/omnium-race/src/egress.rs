//! Event egress: the channel carrying [`RaceEvent`]s out of the race.
//!
//! Riders publish from their own threads through a cloned [`EventSink`];
//! consumers drain the matching [`EventStream`]. The channel is
//! unbounded so a slow consumer can never stall a rider mid-move, and
//! events are stamped by the sender, so per-rider causal order is the
//! channel's FIFO order.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use omnium_core::RaceEvent;

/// Create a connected sink/stream pair for one race.
pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, EventStream { rx })
}

/// Sending half. One clone per rider worker; the race holds no copy of
/// its own, so dropping the workers closes the stream.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<RaceEvent>,
}

impl EventSink {
    /// Publish one event.
    ///
    /// A send failure means every receiver is gone; the race outcome
    /// does not depend on observers, so the event is silently dropped.
    pub fn publish(&self, event: RaceEvent) {
        let _ = self.tx.send(event);
    }
}

/// Receiving half of the event channel.
pub struct EventStream {
    rx: Receiver<RaceEvent>,
}

impl EventStream {
    /// Block for the next event; `None` once every sink is dropped and
    /// the channel is drained.
    pub fn recv(&self) -> Option<RaceEvent> {
        self.rx.recv().ok()
    }

    /// Non-blocking poll: `Ok(None)` when the channel is momentarily
    /// empty, `Err(())` once it is closed and drained.
    pub fn try_recv(&self) -> Result<Option<RaceEvent>, ()> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(()),
        }
    }

    /// Drain everything currently buffered plus whatever arrives until
    /// the channel closes. Consumes the stream.
    pub fn collect_all(self) -> Vec<RaceEvent> {
        self.rx.into_iter().collect()
    }
}

impl IntoIterator for EventStream {
    type Item = RaceEvent;
    type IntoIter = crossbeam_channel::IntoIter<RaceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}
