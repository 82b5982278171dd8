use std::sync::Arc;

use shared::message::{BusMessage, EventType, FeedEvent, NotificationPayload};
use shared::models::Urgency;
use shared::util::now_millis;
use tokio::sync::broadcast;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError};
use crate::floor::{ChangeFeedAdapter, FeedOutcome, FloorChange, FloorEngine};
use crate::message::MessageBus;
use crate::storage::FloorStorage;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | engine | Arc<FloorEngine> | 桌台引擎 |
/// | feed | Arc<ChangeFeedAdapter> | 远端变更入口 |
/// | message_bus | MessageBus | 消息总线 |
/// | started_at | i64 | 启动时间 (Unix millis) |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub engine: Arc<FloorEngine>,
    pub feed: Arc<ChangeFeedAdapter>,
    pub message_bus: MessageBus,
    pub started_at: i64,
}

impl ServerState {
    /// 用现成的引擎构造 (测试常用)
    pub fn new(config: Config, engine: FloorEngine) -> Self {
        let engine = Arc::new(engine);
        Self {
            config,
            feed: Arc::new(ChangeFeedAdapter::new(engine.clone())),
            engine,
            message_bus: MessageBus::new(),
            started_at: now_millis(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 校验配置
    /// 2. 工作目录结构
    /// 3. 数据库 (work_dir/database/floor.redb)
    /// 4. 桌台引擎 (加载桌台、状态、拼桌并重建计时器)
    pub fn initialize(config: &Config) -> Result<Self> {
        config.validate().map_err(ServerError::Config)?;
        config.ensure_work_dir_structure()?;

        let storage = FloorStorage::open(config.database_path())?;
        let engine = FloorEngine::open(storage, config.floor.clone(), config.node_id.clone())?;

        Ok(Self::new(config.clone(), engine))
    }

    /// 启动后台任务
    ///
    /// - `change_forwarder` - 引擎变更 -> 消息总线 (Sync, 本节点的 Feed)
    /// - `feed_listener` - 消息总线上的远端 Feed -> 引擎
    /// - `timer_tick` - 刷新占用计时器，超时桌台发送警告通知
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::with_token(self.message_bus.shutdown_token().clone());

        let token = tasks.shutdown_token();
        let changes = self.engine.subscribe();
        let bus = self.message_bus.clone();
        let node_id = self.config.node_id.clone();
        tasks.spawn("change_forwarder", TaskKind::Worker, async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = forward_changes(changes, bus, node_id) => {}
            }
        });

        let token = tasks.shutdown_token();
        let inbound = self.message_bus.subscribe_inbound();
        let feed = self.feed.clone();
        tasks.spawn("feed_listener", TaskKind::Listener, async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = listen_feed(inbound, feed) => {}
            }
        });

        let token = tasks.shutdown_token();
        let engine = self.engine.clone();
        let bus = self.message_bus.clone();
        let period = std::time::Duration::from_millis(self.config.timer_tick_ms);
        tasks.spawn("timer_tick", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => tick_timers(&engine, &bus),
                }
            }
        });

        tasks.log_summary();
        tasks
    }

    /// 运行时长 (秒)
    pub fn uptime_secs(&self) -> u64 {
        shared::util::elapsed_secs(self.started_at, now_millis())
    }
}

/// Every committed change becomes a UI sync signal; changes made here are
/// also re-published as feed events for peer nodes.
async fn forward_changes(
    mut changes: broadcast::Receiver<FloorChange>,
    bus: MessageBus,
    node_id: String,
) {
    tracing::info!("Change forwarder started");
    loop {
        match changes.recv().await {
            Ok(change) => forward_one(&change, &bus, &node_id),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::error!(skipped = n, "Change forwarder lagged, screens may need a full reload");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Engine channel closed, change forwarder stopping");
                break;
            }
        }
    }
}

fn forward_one(change: &FloorChange, bus: &MessageBus, node_id: &str) {
    let event = &change.event;
    match BusMessage::sync(&event.to_sync(change.action)) {
        Ok(msg) => {
            // No subscriber is fine
            let _ = bus.publish(msg.with_source(node_id));
        }
        Err(e) => tracing::error!(error = %e, "Failed to encode sync message"),
    }

    if event.origin.as_deref() == Some(node_id) {
        match BusMessage::feed(event) {
            Ok(msg) => {
                let _ = bus.publish(msg.with_source(node_id));
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode feed message"),
        }
    }
}

async fn listen_feed(mut inbound: broadcast::Receiver<BusMessage>, feed: Arc<ChangeFeedAdapter>) {
    tracing::info!("Feed listener started");
    loop {
        match inbound.recv().await {
            Ok(msg) if msg.event_type == EventType::Feed => {
                let event: FeedEvent = match msg.parse_payload() {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, source = ?msg.source, "Malformed feed message");
                        continue;
                    }
                };
                match feed.apply(&event) {
                    Ok(FeedOutcome::Applied) => {}
                    Ok(outcome) => {
                        tracing::debug!(event_id = %event.event_id, ?outcome, "Feed event skipped");
                    }
                    Err(e) => {
                        tracing::warn!(
                            event_id = %event.event_id,
                            entity = %event.entity,
                            id = event.id,
                            error = %e,
                            "Feed event rejected"
                        );
                    }
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Feed listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn tick_timers(engine: &FloorEngine, bus: &MessageBus) {
    for change in engine.tick(now_millis()) {
        tracing::debug!(
            table_id = change.table_id,
            from = ?change.from,
            to = ?change.to,
            "Occupancy urgency changed"
        );
        if change.to != Urgency::Red {
            continue;
        }
        tracing::warn!(
            table_id = change.table_id,
            elapsed_secs = change.elapsed_secs,
            expected_secs = change.expected_secs,
            "Table past its expected release"
        );
        let payload = NotificationPayload::warning(
            "Mesa excedida",
            format!(
                "Table {} has been occupied for {} min (expected {} min)",
                change.table_id,
                change.elapsed_secs / 60,
                change.expected_secs / 60
            ),
        )
        .with_data(serde_json::json!({
            "table_id": change.table_id,
            "elapsed_secs": change.elapsed_secs,
            "expected_secs": change.expected_secs,
        }));
        match BusMessage::notification(&payload) {
            Ok(msg) => {
                let _ = bus.publish(msg);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode notification"),
        }
    }
}
