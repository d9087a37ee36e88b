//! Connection registry and broadcast hub: the live half of the chat service.
pub mod conn;
pub mod handler;
pub mod heartbeat;
pub mod hub;
pub mod message;
pub mod queue;
pub mod registry;
pub mod store;

pub use conn::{ConnError, ConnId, Outbound, WsOutbound};
pub use handler::Handler;
pub use hub::Hub;
pub use message::Message;
pub use queue::{Overflow, Queue, QueueError};
pub use registry::Registry;
pub use store::{MessageStore, SqliteStore};
