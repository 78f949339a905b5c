//! 服务层 - 服务器核心服务
//!
//! # 服务列表
//!
//! - [`TagService`] - 标签层级（创建、移动、删除、查询）
//! - [`seed_demo_tags`] - 空库演示数据

pub mod error;
pub mod seed;
pub mod tag_service;

pub use error::{TagError, TagResult};
pub use seed::seed_demo_tags;
pub use tag_service::TagService;
