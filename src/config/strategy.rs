//! 分片策略配置

use serde::{Deserialize, Serialize};

/// 分片算法描述
///
/// 内置算法按参数直接构建；`custom` 通过名称在 `AlgorithmRegistry` 中查找。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum AlgorithmConfig {
    Mod { sharding_count: u64 },
    HashMod { sharding_count: u64 },
    BoundaryRange { boundaries: Vec<i64> },
    VolumeRange { lower: i64, upper: i64, volume: i64 },
    Custom { name: String },
}

impl AlgorithmConfig {
    pub fn modulo(sharding_count: u64) -> Self {
        AlgorithmConfig::Mod { sharding_count }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        AlgorithmConfig::Custom { name: name.into() }
    }

    pub fn type_name(&self) -> &str {
        match self {
            AlgorithmConfig::Mod { .. } => "mod",
            AlgorithmConfig::HashMod { .. } => "hash_mod",
            AlgorithmConfig::BoundaryRange { .. } => "boundary_range",
            AlgorithmConfig::VolumeRange { .. } => "volume_range",
            AlgorithmConfig::Custom { name } => name,
        }
    }
}

/// 分片策略描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ShardingStrategyConfig {
    /// 单分片列，精确算法必选，范围算法可选
    Standard {
        sharding_column: String,
        precise_algorithm: AlgorithmConfig,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range_algorithm: Option<AlgorithmConfig>,
    },
    /// 多分片列，算法必须在注册表中按名称提供
    Complex {
        sharding_columns: Vec<String>,
        algorithm: String,
    },
    /// 单分片列，行表达式算法，例如 `t_order_${order_id % 2}`
    Inline {
        sharding_column: String,
        algorithm_expression: String,
    },
    /// 不分片，总是路由到全部候选目标
    None,
}

impl ShardingStrategyConfig {
    pub fn standard(column: impl Into<String>, precise: AlgorithmConfig) -> Self {
        ShardingStrategyConfig::Standard {
            sharding_column: column.into(),
            precise_algorithm: precise,
            range_algorithm: None,
        }
    }

    pub fn standard_with_range(
        column: impl Into<String>,
        precise: AlgorithmConfig,
        range: AlgorithmConfig,
    ) -> Self {
        ShardingStrategyConfig::Standard {
            sharding_column: column.into(),
            precise_algorithm: precise,
            range_algorithm: Some(range),
        }
    }

    pub fn inline(column: impl Into<String>, expression: impl Into<String>) -> Self {
        ShardingStrategyConfig::Inline {
            sharding_column: column.into(),
            algorithm_expression: expression.into(),
        }
    }

    pub fn complex<I, S>(columns: I, algorithm: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ShardingStrategyConfig::Complex {
            sharding_columns: columns.into_iter().map(Into::into).collect(),
            algorithm: algorithm.into(),
        }
    }
}
