use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notification Level ====================

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ==================== Payloads ====================

/// 通知载荷 (服务端 -> 客户端)
///
/// Staff-facing alerts, e.g. a table running past its estimated release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    /// 附加数据 (JSON)
    pub data: Option<serde_json::Value>,
}

impl NotificationPayload {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Info,
            data: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Warning,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// 同步信号载荷 (服务端 -> 所有客户端)
///
/// Broadcast whenever a floor entity changes so that connected screens
/// refresh just that entity.
///
/// # 示例
/// - `resource`: "table_state"
/// - `version`: 42
/// - `action`: "updated"
/// - `id`: "7241298371"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 ("table", "table_state", "combination")
    pub resource: String,
    /// Entity version after the change
    pub version: u64,
    /// 变更类型 ("created", "updated", "dissolved", "deactivated")
    pub action: String,
    /// 资源 ID
    pub id: String,
    /// 资源数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ==================== Change Feed ====================

/// Entity kind carried by a change feed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedEntity {
    Table,
    TableState,
    Combination,
}

impl FeedEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedEntity::Table => "table",
            FeedEntity::TableState => "table_state",
            FeedEntity::Combination => "combination",
        }
    }
}

impl fmt::Display for FeedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change feed event (`{entity, id, payload, timestamp}` plus version)
///
/// Delivered possibly out of order and more than once; consumers apply it
/// last-write-wins by `timestamp` and de-duplicate by `(entity, id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub event_id: String,
    pub entity: FeedEntity,
    pub id: i64,
    pub version: u64,
    /// Unix millis of the change at its origin
    pub timestamp: i64,
    /// Node that produced the change
    #[serde(default)]
    pub origin: Option<String>,
    /// Full entity after the change
    pub payload: serde_json::Value,
}

impl FeedEvent {
    pub fn new(
        entity: FeedEntity,
        id: i64,
        version: u64,
        timestamp: i64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            entity,
            id,
            version,
            timestamp,
            origin: None,
            payload,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Matching UI sync signal
    pub fn to_sync(&self, action: &str) -> SyncPayload {
        SyncPayload {
            resource: self.entity.as_str().to_string(),
            version: self.version,
            action: action.to_string(),
            id: self.id.to_string(),
            data: Some(self.payload.clone()),
        }
    }
}
