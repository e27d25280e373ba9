//! 配置错误类型
//!
//! 所有配置错误都在规则构建时被检测出来，构建成功的规则内部一致。
//! 主键生成器耗尽同样归为配置错误，在首次使用时暴露。

use thiserror::Error;

use crate::core::error::codes::{ErrorCode, ToPublicError};

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("无效的行表达式 '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("无效的数据节点 '{0}'，格式应为 <数据源>.<表名>")]
    InvalidDataNode(String),

    #[error("逻辑表 '{logic_table}' 引用了未配置的数据源 '{data_source}'")]
    UnknownDataSource {
        logic_table: String,
        data_source: String,
    },

    #[error("数据源列表不能为空")]
    NoDataSource,

    #[error("数据源名称无效: '{0}'")]
    InvalidDataSourceName(String),

    #[error("数据源重复定义: {0}")]
    DuplicateDataSource(String),

    #[error("逻辑表名不能为空")]
    EmptyLogicTable,

    #[error("逻辑表重复定义: {0}")]
    DuplicateLogicTable(String),

    #[error("逻辑表 '{0}' 没有任何数据节点")]
    EmptyDataNodes(String),

    #[error("绑定表组 '{0}' 至少需要两张表")]
    BindingGroupTooSmall(String),

    #[error("绑定表 '{0}' 没有配置分片规则")]
    BindingTableWithoutRule(String),

    #[error("表 '{0}' 同时出现在多个绑定表组中")]
    DuplicateBindingTable(String),

    #[error("绑定表分片数量不一致: '{left}' 有 {left_count} 个数据节点, '{right}' 有 {right_count} 个")]
    BindingCardinalityMismatch {
        left: String,
        left_count: usize,
        right: String,
        right_count: usize,
    },

    #[error("绑定表 '{left}' 与 '{right}' 在第 {position} 个分片上的数据源不一致")]
    BindingDataSourceMismatch {
        left: String,
        right: String,
        position: usize,
    },

    #[error("广播表重复定义或与分片表冲突: {0}")]
    DuplicateBroadcastTable(String),

    #[error("默认数据源 '{0}' 未配置")]
    InvalidDefaultDataSource(String),

    #[error("分片列不能为空")]
    EmptyShardingColumn,

    #[error("未知的分片算法: {0}")]
    UnknownAlgorithm(String),

    #[error("分片算法 '{algorithm}' 参数无效: {reason}")]
    InvalidAlgorithm { algorithm: String, reason: String },

    #[error("分片算法 '{0}' 不支持范围分片")]
    RangeNotSupported(String),

    #[error("逻辑表 '{0}' 配置了多个主键生成器")]
    DuplicateKeyGenerator(String),

    #[error("逻辑表 '{0}' 未配置主键生成器")]
    KeyGeneratorNotFound(String),

    #[error("主键生成器 '{kind}' 参数无效: {reason}")]
    InvalidKeyGeneratorOption { kind: String, reason: String },

    #[error("主键生成器 '{0}' 已耗尽")]
    KeyGeneratorExhausted(String),

    #[error("时钟回拨 {0} 毫秒，超过容忍范围")]
    ClockMovedBackwards(i64),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("配置解析错误: {0}")]
    Parse(String),

    #[error("配置序列化错误: {0}")]
    Serialize(String),
}

impl ConfigError {
    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn algorithm(algorithm: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidAlgorithm {
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn key_generator_option(kind: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidKeyGeneratorOption {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e.to_string())
    }
}

impl ToPublicError for ConfigError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            ConfigError::InvalidExpression { .. } | ConfigError::InvalidDataNode(_) => {
                ErrorCode::InvalidExpression
            }
            ConfigError::UnknownDataSource { .. } | ConfigError::InvalidDefaultDataSource(_) => {
                ErrorCode::UnknownDataSource
            }
            ConfigError::DuplicateDataSource(_)
            | ConfigError::DuplicateLogicTable(_)
            | ConfigError::DuplicateBindingTable(_)
            | ConfigError::DuplicateBroadcastTable(_)
            | ConfigError::DuplicateKeyGenerator(_) => ErrorCode::DuplicateDefinition,
            ConfigError::BindingGroupTooSmall(_)
            | ConfigError::BindingTableWithoutRule(_)
            | ConfigError::BindingCardinalityMismatch { .. }
            | ConfigError::BindingDataSourceMismatch { .. } => ErrorCode::BindingMismatch,
            ConfigError::UnknownAlgorithm(_)
            | ConfigError::InvalidAlgorithm { .. }
            | ConfigError::RangeNotSupported(_) => ErrorCode::InvalidAlgorithm,
            ConfigError::KeyGeneratorNotFound(_) => ErrorCode::KeyGeneratorMissing,
            ConfigError::KeyGeneratorExhausted(_) | ConfigError::ClockMovedBackwards(_) => {
                ErrorCode::KeyGeneratorUnavailable
            }
            _ => ErrorCode::InvalidConfiguration,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            ConfigError::Io(_) => "配置文件读写失败".to_string(),
            _ => self.to_string(),
        }
    }
}
