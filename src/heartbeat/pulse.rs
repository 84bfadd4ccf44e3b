//! # Liveness pulses.
//!
//! [`Heartbeat`] is the sending half: a capacity-1 channel written with
//! `try_send`, so a pulse nobody is waiting for is simply dropped and the
//! sender never blocks.

use tokio::sync::mpsc;

/// A content-free liveness signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulse;

/// Receiving half of a heartbeat.
pub type Pulses = mpsc::Receiver<Pulse>;

/// Best-effort sender of [`Pulse`]s.
#[derive(Clone, Debug)]
pub struct Heartbeat {
    tx: mpsc::Sender<Pulse>,
}

impl Heartbeat {
    /// Creates a connected heartbeat sender and pulse stream.
    pub fn channel() -> (Self, Pulses) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Attempts a pulse without waiting.
    ///
    /// Returns `false` when the pulse was dropped (one is already pending or the
    /// receiver is gone). Callers are expected to ignore that.
    pub fn pulse(&self) -> bool {
        self.tx.try_send(Pulse).is_ok()
    }

    /// True once the watcher has dropped its [`Pulses`].
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pulse_never_blocks() {
        let (hb, mut pulses) = Heartbeat::channel();
        assert!(hb.pulse());
        assert!(!hb.pulse(), "second pulse must be dropped, not queued");
        assert_eq!(pulses.recv().await, Some(Pulse));
        assert!(hb.pulse());
    }

    #[tokio::test]
    async fn test_closed_when_watcher_leaves() {
        let (hb, pulses) = Heartbeat::channel();
        drop(pulses);
        assert!(hb.is_closed());
        assert!(!hb.pulse());
    }

    #[tokio::test]
    async fn test_stream_ends_when_sender_dropped() {
        let (hb, mut pulses) = Heartbeat::channel();
        drop(hb);
        assert_eq!(pulses.recv().await, None);
    }
}
