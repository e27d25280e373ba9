//! 路由错误类型
//!
//! 路由错误按语句暴露给调用方，执行管道必须中止该语句，
//! 不能在部分分片上继续执行。

use thiserror::Error;

use crate::core::error::codes::{ErrorCode, ToPublicError};

/// 路由结果类型
pub type RoutingResult<T> = Result<T, RoutingError>;

/// 路由错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("逻辑表 '{0}' 没有配置分片规则")]
    TableRuleNotFound(String),

    #[error("逻辑表 '{logic_table}' 的分片列 '{column}' 取值 {value} 无法匹配任何分片")]
    NoMatchingTarget {
        logic_table: String,
        column: String,
        value: String,
    },

    #[error("逻辑表 '{logic_table}' 的分片列 '{column}' 条件为空")]
    EmptyPredicate { logic_table: String, column: String },

    #[error("逻辑表 '{logic_table}' 的分片列 '{column}' 范围条件没有命中任何分片")]
    EmptyRangeResult { logic_table: String, column: String },

    #[error("逻辑表 '{logic_table}' 的复合分片列 {columns:?} 没有命中任何分片")]
    EmptyComplexResult {
        logic_table: String,
        columns: Vec<String>,
    },

    #[error("逻辑表 '{0}' 的路由结果与已声明的数据节点没有交集")]
    EmptyRoute(String),

    #[error("逻辑表 '{logic_table}' 未分片却声明在 {node_count} 个数据节点上，写入路由不明确")]
    AmbiguousRoute {
        logic_table: String,
        node_count: usize,
    },

    #[error("逻辑表 '{logic_table}' 的插入语句路由到了 {node_count} 个数据节点")]
    InsertMultipleNodes {
        logic_table: String,
        node_count: usize,
    },

    #[error("分片算法 '{algorithm}' 不支持取值 {value}")]
    UnsupportedValue { algorithm: String, value: String },

    #[error("行表达式 '{expression}' 求值失败: {reason}")]
    InlineEvaluation { expression: String, reason: String },

    #[error("绑定表 '{logic_table}' 无法复用 '{source_table}' 的第 {position} 个分片")]
    BindingPositionOutOfRange {
        logic_table: String,
        source_table: String,
        position: usize,
    },
}

impl RoutingError {
    /// 判断错误是否源于调用方给出的分片值
    ///
    /// 这类错误表明谓词与分片配置不匹配，而不是规则本身有缺陷
    pub fn is_value_mismatch(&self) -> bool {
        matches!(
            self,
            RoutingError::NoMatchingTarget { .. }
                | RoutingError::EmptyPredicate { .. }
                | RoutingError::EmptyRangeResult { .. }
                | RoutingError::EmptyComplexResult { .. }
                | RoutingError::UnsupportedValue { .. }
                | RoutingError::InlineEvaluation { .. }
        )
    }
}

impl ToPublicError for RoutingError {
    fn to_error_code(&self) -> ErrorCode {
        match self {
            RoutingError::TableRuleNotFound(_) => ErrorCode::TableRuleNotFound,
            RoutingError::NoMatchingTarget { .. }
            | RoutingError::EmptyPredicate { .. }
            | RoutingError::EmptyRangeResult { .. }
            | RoutingError::EmptyComplexResult { .. }
            | RoutingError::EmptyRoute(_) => ErrorCode::NoMatchingShard,
            RoutingError::AmbiguousRoute { .. } | RoutingError::InsertMultipleNodes { .. } => {
                ErrorCode::AmbiguousRoute
            }
            RoutingError::UnsupportedValue { .. } | RoutingError::InlineEvaluation { .. } => {
                ErrorCode::UnsupportedValue
            }
            RoutingError::BindingPositionOutOfRange { .. } => ErrorCode::InternalError,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            RoutingError::BindingPositionOutOfRange { .. } => "内部错误".to_string(),
            _ => self.to_string(),
        }
    }
}
