//! 消息总线消息类型定义
//!
//! 这些类型在 floor-server 和 clients 之间共享，用于
//! 进程内（内存）广播和变更订阅。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 消息总线事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 系统通知 (计时器超时等)
    Notification,
    /// 同步信号，屏幕据此刷新
    Sync,
    /// 完整变更事件，供对端节点回放
    Feed,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
            EventType::Feed => write!(f, "feed"),
        }
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub source: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            source: None,
            payload,
        }
    }

    /// 设置来源节点
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// 创建通知消息
    pub fn notification(payload: &NotificationPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Notification, serde_json::to_vec(payload)?))
    }

    /// 创建同步信号消息
    pub fn sync(payload: &SyncPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Sync, serde_json::to_vec(payload)?))
    }

    /// 创建变更事件消息
    pub fn feed(event: &FeedEvent) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Feed, serde_json::to_vec(event)?))
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
