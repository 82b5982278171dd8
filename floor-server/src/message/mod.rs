//! 消息总线模块
//!
//! In-process broadcast between the engine, connected screens and peer
//! nodes. Message types live in `shared::message`.

pub mod bus;

pub use bus::MessageBus;
pub use shared::message::{BusMessage, EventType, FeedEvent, NotificationPayload, SyncPayload};
