//! 消息总线核心实现
//!
//! # 消息流
//!
//! ```text
//! FloorEngine ──▶ publish() ──▶ server_tx ──▶ screens / peer nodes
//!                                (Sync, Feed, Notification)
//!
//! peer node ──▶ send_to_server() ──▶ inbound_tx ──▶ feed listener
//!                                     (Feed)
//! ```

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::utils::AppError;

/// Default capacity of both broadcast channels
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 消息总线 - 负责消息路由和转发
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 对端节点到服务器的消息通道
    inbound_tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// 创建默认配置的消息总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        let (inbound_tx, _) = broadcast::channel(capacity);
        Self {
            server_tx,
            inbound_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息 (服务器 -> 所有订阅者)
    ///
    /// Fails only when nobody is subscribed.
    pub fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        self.server_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// 发送消息到服务器 (对端 -> 服务器)
    pub fn send_to_server(&self, msg: BusMessage) -> Result<(), AppError> {
        self.inbound_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))?;
        Ok(())
    }

    /// 订阅服务器广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 订阅对端消息 (服务器专用)
    pub fn subscribe_inbound(&self) -> broadcast::Receiver<BusMessage> {
        self.inbound_tx.subscribe()
    }

    /// 获取关闭令牌
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Current number of broadcast subscribers
    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
