//! Floor Server - 餐厅桌台占用与拼桌服务
//!
//! # 架构概述
//!
//! - **桌台引擎** (`floor`): 状态机、拼桌、占用计时器、分配建议
//! - **存储** (`storage`): 嵌入式 redb，单事务提交多表变更
//! - **消息总线** (`message`): 进程内广播 (Sync / Feed / Notification)
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! floor-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── floor/         # 桌台引擎
//! ├── storage.rs     # redb 持久化
//! ├── api/           # HTTP 路由和处理器
//! ├── message/       # 消息总线
//! └── utils/         # 日志、错误、校验
//! ```

pub mod api;
pub mod core;
pub mod floor;
pub mod message;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use floor::{ChangeFeedAdapter, FeedOutcome, FloorConfig, FloorEngine, FloorError};
pub use message::{BusMessage, EventType, MessageBus};
pub use storage::FloorStorage;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 加载 .env、创建工作目录并初始化日志
pub fn setup_environment() -> Result<Config, ServerError> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        log_dir.to_str(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ________
   / ____/ /___  ____  _____
  / /_  / / __ \/ __ \/ ___/
 / __/ / / /_/ / /_/ / /
/_/   /_/\____/\____/_/
    "#
    );
}
