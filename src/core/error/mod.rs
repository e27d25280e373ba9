//! 统一错误处理系统
//!
//! ## 设计理念
//!
//! 1. **按阶段划分**：
//!    - `ConfigError` 只在规则构建期（以及主键生成器首次耗尽时）出现
//!    - `RoutingError` 只在单条语句的路由期出现
//!
//! 2. **分层转换**：子错误通过 `#[from]` 自动转换为 `ShardingError`，保留完整信息
//!
//! 3. **统一接口**：`ShardingResult<T>` 用于同时涉及主键生成与路由的操作

use thiserror::Error;

pub mod codes;
pub mod config;
pub mod routing;

pub use codes::{ErrorCategory, ErrorCode, PublicError, ToPublicError};
pub use config::{ConfigError, ConfigResult};
pub use routing::{RoutingError, RoutingResult};

/// 统一的分片错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShardingError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("路由错误: {0}")]
    Routing(#[from] RoutingError),
}

/// 统一的结果类型
pub type ShardingResult<T> = Result<T, ShardingError>;

impl ToPublicError for ShardingError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            ShardingError::Config(e) => e.to_error_code(),
            ShardingError::Routing(e) => e.to_error_code(),
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            ShardingError::Config(e) => e.to_public_message(),
            ShardingError::Routing(e) => e.to_public_message(),
        }
    }
}
