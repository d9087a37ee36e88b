//! Bounded many-producer, single-consumer queue feeding the hub.
use std::str::FromStr;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::message::Message;

/// What a producer does when the queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    /// Park the producer until the hub frees a slot.
    Block,
    /// Drop the new message and carry on.
    Reject,
}

impl FromStr for Overflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block"  => Ok(Overflow::Block),
            "reject" => Ok(Overflow::Reject),
            other    => Err(format!("unknown overflow policy `{other}` (block|reject)")),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("broadcast queue full, message dropped")]
    Full,
    #[error("broadcast hub has stopped")]
    Closed,
}

/// Producer handle, one clone per connection handler.
#[derive(Clone)]
pub struct Queue {
    tx:     mpsc::Sender<Message>,
    policy: Overflow,
}

pub type QueueRx = mpsc::Receiver<Message>;

pub fn channel(capacity: usize, policy: Overflow) -> (Queue, QueueRx) {
    let (tx, rx) = mpsc::channel(capacity);
    (Queue { tx, policy }, rx)
}

impl Queue {
    pub async fn enqueue(&self, msg: Message) -> Result<(), QueueError> {
        match self.policy {
            Overflow::Block => self.tx.send(msg).await.map_err(|_| QueueError::Closed),
            Overflow::Reject => self.tx.try_send(msg).map_err(|e| match e {
                TrySendError::Full(_)   => QueueError::Full,
                TrySendError::Closed(_) => QueueError::Closed,
            }),
        }
    }
}
