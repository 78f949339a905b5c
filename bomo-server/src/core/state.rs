use crate::core::Config;
use crate::core::error::{Result, ServerError};
use crate::db::DbService;
use crate::services::{TagService, seed_demo_tags};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝 (连接池与服务内部使用 Arc)，可以直接作为
/// axum 的 `State` 在每个请求间克隆。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | tags | TagService | 标签层级服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub tags: TagService,
}

impl ServerState {
    /// 组装状态 (依赖注入，测试可传入内存数据库)
    pub fn new(config: Config, db: DbService) -> Self {
        let tags = TagService::new(db.clone());
        Self { config, db, tags }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库并执行迁移
    /// 3. 按配置写入演示数据
    pub async fn initialize(config: &Config) -> Result<Self> {
        if config.database_path.trim().is_empty() {
            return Err(ServerError::Config("DATABASE_PATH must not be empty".into()));
        }
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create work dir {}: {e}", config.work_dir))?;

        let db = DbService::new(&config.database_path)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let state = Self::new(config.clone(), db);

        if config.seed_demo_data {
            seed_demo_tags(&state.tags)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed demo data: {e}"))?;
        }

        Ok(state)
    }
}
