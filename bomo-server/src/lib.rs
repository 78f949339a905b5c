//! BOMO Server - 个人知识管理后端
//!
//! # 架构概述
//!
//! 核心是标签层级：标签组成森林，每个标签缓存自己的深度 (`level`)。
//! 服务保证无环、层级缓存一致、仅叶子可删、名称全局大小写不敏感唯一。
//!
//! # 模块结构
//!
//! ```text
//! bomo-server/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── hierarchy/     # 纯内存层级引擎 (层级计算、环检测、建树、路径)
//! ├── services/      # TagService (锁 + 事务) 与演示数据
//! ├── db/            # SQLite 连接池与仓储函数
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志
//! └── utils/         # 错误、日志、输入校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod hierarchy;
pub mod middleware;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use services::{TagError, TagService};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`、读取配置、初始化日志
///
/// 生产环境输出 JSON 日志。
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    // .env 是可选的
    let dotenv_result = dotenv::dotenv();

    let config = Config::from_env();
    if let Some(dir) = config.log_dir.as_deref() {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );

    if let Err(e) = dotenv_result {
        tracing::debug!("No .env file loaded: {e}");
    }
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  __  _______
   / __ )/ __ \/  |/  / __ \
  / __  / / / / /|_/ / / / /
 / /_/ / /_/ / /  / / /_/ /
/_____/\____/_/  /_/\____/
    "#
    );
}
