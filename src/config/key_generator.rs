//! 主键生成器配置

use serde::{Deserialize, Serialize};
use std::fmt;

/// 主键生成器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyGeneratorKind {
    /// 原子自增计数器
    #[serde(alias = "INCREMENT")]
    Increment,
    /// 时间戳 + 工作节点 + 序列号
    #[serde(alias = "SNOWFLAKE")]
    Snowflake,
    /// 随机 UUID
    #[serde(alias = "UUID")]
    Uuid,
}

impl fmt::Display for KeyGeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyGeneratorKind::Increment => "increment",
            KeyGeneratorKind::Snowflake => "snowflake",
            KeyGeneratorKind::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// 主键生成器参数
///
/// 每种生成器只接受属于自己的参数，多余参数在构建时报错。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyGeneratorProps {
    /// increment: 已有数据的最大主键，生成值从 seed + 1 开始
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// snowflake: 工作节点编号，取值 0..1024
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<i64>,
    /// snowflake: 可容忍的时钟回拨毫秒数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tolerate_time_difference_ms: Option<u64>,
}

/// 单张逻辑表的主键生成器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyGeneratorConfig {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: KeyGeneratorKind,
    #[serde(default)]
    pub props: KeyGeneratorProps,
}

impl KeyGeneratorConfig {
    pub fn new(kind: KeyGeneratorKind, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind,
            props: KeyGeneratorProps::default(),
        }
    }

    pub fn increment(column: impl Into<String>) -> Self {
        Self::new(KeyGeneratorKind::Increment, column)
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.props.seed = Some(seed);
        self
    }

    pub fn with_worker_id(mut self, worker_id: i64) -> Self {
        self.props.worker_id = Some(worker_id);
        self
    }
}
