use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::Value,
};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// FIFO queue of values used for inter-worker transfer. A `Channel` is a
/// cheap cloneable handle; both ends live as long as any handle does, so a
/// channel is never destroyed during a run.
#[derive(Clone)]
pub struct Channel {
    name: Arc<str>,
    sender: Sender<Value>,
    receiver: Receiver<Value>,
}

impl Channel {
    pub fn unbounded(name: &str) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            name: Arc::from(name),
            sender,
            receiver,
        }
    }

    pub fn bounded(name: &str, capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self {
            name: Arc::from(name),
            sender,
            receiver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocking put; blocks only when the channel is bounded and full.
    pub fn send(&self, value: Value) -> RuntimeResult<()> {
        self.sender
            .send(value)
            .map_err(|_| RuntimeError::ChannelClosed {
                name: self.name.to_string(),
            })
    }

    /// Blocking get; with a timeout, failure to produce a value in time is
    /// a `ReceiveTimeout`.
    pub fn recv(&self, timeout: Option<Duration>) -> RuntimeResult<Value> {
        match timeout {
            None => self
                .receiver
                .recv()
                .map_err(|_| RuntimeError::ChannelClosed {
                    name: self.name.to_string(),
                }),
            Some(timeout) => self.receiver.recv_timeout(timeout).map_err(|err| match err {
                RecvTimeoutError::Timeout => RuntimeError::ReceiveTimeout {
                    name: self.name.to_string(),
                },
                RecvTimeoutError::Disconnected => RuntimeError::ChannelClosed {
                    name: self.name.to_string(),
                },
            }),
        }
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn delivers_values_in_fifo_order() {
        let chan = Channel::unbounded("c");
        chan.send(Value::Int(1)).unwrap();
        chan.send(Value::Int(2)).unwrap();
        assert_eq!(chan.len(), 2);
        assert_eq!(chan.recv(None).unwrap().as_int(), Some(1));
        assert_eq!(chan.recv(None).unwrap().as_int(), Some(2));
        assert!(chan.is_empty());
    }

    #[test]
    fn recv_times_out_on_empty_channel() {
        let chan = Channel::unbounded("c");
        let err = chan.recv(Some(Duration::from_millis(10))).unwrap_err();
        assert!(matches!(err, RuntimeError::ReceiveTimeout { name } if name == "c"));
    }

    #[test]
    fn bounded_channel_holds_up_to_capacity() {
        let chan = Channel::bounded("c", 2);
        chan.send(Value::Int(1)).unwrap();
        chan.send(Value::Int(2)).unwrap();
        assert_eq!(chan.len(), 2);
    }

    #[test]
    fn send_to_full_bounded_channel_blocks_until_a_receive() {
        let chan = Channel::bounded("c", 1);
        chan.send(Value::Int(1)).unwrap();

        let sender = {
            let chan = chan.clone();
            thread::spawn(move || chan.send(Value::Int(2)))
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!sender.is_finished());

        assert_eq!(chan.recv(None).unwrap().as_int(), Some(1));
        sender.join().unwrap().unwrap();
        assert_eq!(chan.recv(None).unwrap().as_int(), Some(2));
    }

    #[test]
    fn clones_share_the_same_queue() {
        let chan = Channel::unbounded("c");
        let other = chan.clone();
        other.send(Value::Int(7)).unwrap();
        assert_eq!(chan.recv(None).unwrap().as_int(), Some(7));
    }
}
