use std::path::PathBuf;

use crate::floor::{FloorConfig, SuggestConfig};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};

/// 服务器配置 - 楼面节点的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/floor | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | NODE_ID | floor-<uuid> | 变更事件来源节点 |
/// | TIMER_TICK_MS | 1000 | 计时器刷新间隔 |
/// | DEFAULT_OCCUPANCY_SECS | 7200 | 默认用餐时长(秒) |
/// | SUGGEST_PENALTY_PER_SEAT | 10 | 每个空余座位扣分 |
/// | SUGGEST_MIN_SCORE | 10 | 最低分 |
/// | SUGGEST_ZONE_BONUS | 10 | 区域匹配加分 |
/// | SUGGEST_ZONE_PENALTY | 15 | 区域不匹配扣分 |
/// | SUGGEST_TABLE_PENALTY | 5 | 拼桌每多一张扣分 |
/// | SUGGEST_ADJACENCY_PENALTY | 15 | 相邻未确认扣分 |
/// | COMBINATION_MAX_GROUP | 3 | 拼桌最多桌数 |
/// | COMBINATION_MAX_DISTANCE | (unset) | 拼桌最大距离 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/floor HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Origin stamped on outgoing change feed events
    pub node_id: String,
    /// 计时器刷新间隔 (毫秒)
    pub timer_tick_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// 引擎参数
    pub floor: FloorConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let defaults = SuggestConfig::default();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/floor".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            node_id: std::env::var("NODE_ID")
                .unwrap_or_else(|_| format!("floor-{}", uuid::Uuid::new_v4())),
            timer_tick_ms: env_or("TIMER_TICK_MS", 1000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
            floor: FloorConfig {
                default_occupancy_secs: env_or("DEFAULT_OCCUPANCY_SECS", 7200),
                suggest: SuggestConfig {
                    penalty_per_extra_seat: env_or(
                        "SUGGEST_PENALTY_PER_SEAT",
                        defaults.penalty_per_extra_seat,
                    ),
                    min_score: env_or("SUGGEST_MIN_SCORE", defaults.min_score),
                    zone_match_bonus: env_or("SUGGEST_ZONE_BONUS", defaults.zone_match_bonus),
                    zone_mismatch_penalty: env_or(
                        "SUGGEST_ZONE_PENALTY",
                        defaults.zone_mismatch_penalty,
                    ),
                    combination_table_penalty: env_or(
                        "SUGGEST_TABLE_PENALTY",
                        defaults.combination_table_penalty,
                    ),
                    unconfirmed_adjacency_penalty: env_or(
                        "SUGGEST_ADJACENCY_PENALTY",
                        defaults.unconfirmed_adjacency_penalty,
                    ),
                    max_group_size: env_or("COMBINATION_MAX_GROUP", defaults.max_group_size),
                    max_distance: std::env::var("COMBINATION_MAX_DISTANCE")
                        .ok()
                        .and_then(|v| v.parse().ok()),
                },
            },
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), String> {
        validate_required_text(&self.node_id, "NODE_ID", MAX_SHORT_TEXT_LEN)?;
        if self.timer_tick_ms == 0 {
            return Err("TIMER_TICK_MS must be greater than 0".to_string());
        }
        if self.floor.default_occupancy_secs == 0 {
            return Err("DEFAULT_OCCUPANCY_SECS must be greater than 0".to_string());
        }
        if self.floor.suggest.max_group_size < 2 {
            return Err("COMBINATION_MAX_GROUP must be at least 2".to_string());
        }
        if let Some(d) = self.floor.suggest.max_distance
            && !(d.is_finite() && d > 0.0)
        {
            return Err("COMBINATION_MAX_DISTANCE must be a positive number".to_string());
        }
        Ok(())
    }

    /// redb 数据库文件
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("floor.redb")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 创建工作目录结构
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("database"))?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = Config::with_overrides("/tmp/floor-test", 4010);
        assert_eq!(config.work_dir, "/tmp/floor-test");
        assert_eq!(config.http_port, 4010);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/floor-test/database/floor.redb")
        );
    }

    #[test]
    fn test_validate() {
        let mut config = Config::with_overrides("/tmp/floor-test", 4010);
        config.node_id = "node-a".to_string();
        config.timer_tick_ms = 1000;
        config.floor = FloorConfig::default();
        assert!(config.validate().is_ok());

        config.floor.suggest.max_group_size = 1;
        assert!(config.validate().is_err());

        config.floor.suggest.max_group_size = 3;
        config.floor.suggest.max_distance = Some(-1.0);
        assert!(config.validate().is_err());

        config.floor.suggest.max_distance = None;
        config.node_id = " ".to_string();
        assert!(config.validate().is_err());
    }
}
