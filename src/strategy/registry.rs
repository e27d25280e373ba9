//! 分片算法注册表
//!
//! 自定义算法以行为对象的形式注册，配置中通过 `custom` 名称引用。
//! 注册表只在规则构建期使用，构建完成后规则不再依赖它。

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AlgorithmConfig, ShardingStrategyConfig};
use crate::core::error::{ConfigError, ConfigResult};
use crate::strategy::algorithm::{
    ComplexKeysShardingAlgorithm, PreciseShardingAlgorithm, RangeShardingAlgorithm,
};
use crate::strategy::builtin::{
    BoundaryRangeShardingAlgorithm, HashModShardingAlgorithm, ModShardingAlgorithm,
};
use crate::strategy::inline::InlineShardingAlgorithm;
use crate::strategy::ShardingStrategy;

/// 自定义分片算法注册表
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    precise: HashMap<String, Arc<dyn PreciseShardingAlgorithm>>,
    range: HashMap<String, Arc<dyn RangeShardingAlgorithm>>,
    complex: HashMap<String, Arc<dyn ComplexKeysShardingAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册精确分片算法
    pub fn register_precise(
        &mut self,
        name: impl Into<String>,
        algorithm: Arc<dyn PreciseShardingAlgorithm>,
    ) -> &mut Self {
        self.precise.insert(name.into(), algorithm);
        self
    }

    /// 注册范围分片算法
    pub fn register_range(
        &mut self,
        name: impl Into<String>,
        algorithm: Arc<dyn RangeShardingAlgorithm>,
    ) -> &mut Self {
        self.range.insert(name.into(), algorithm);
        self
    }

    /// 注册复合分片算法
    pub fn register_complex(
        &mut self,
        name: impl Into<String>,
        algorithm: Arc<dyn ComplexKeysShardingAlgorithm>,
    ) -> &mut Self {
        self.complex.insert(name.into(), algorithm);
        self
    }

    pub fn has_precise(&self, name: &str) -> bool {
        self.precise.contains_key(name)
    }

    /// 根据描述构建精确分片算法
    pub fn precise_algorithm(
        &self,
        config: &AlgorithmConfig,
    ) -> ConfigResult<Arc<dyn PreciseShardingAlgorithm>> {
        let algorithm: Arc<dyn PreciseShardingAlgorithm> = match config {
            AlgorithmConfig::Mod { sharding_count } => {
                Arc::new(ModShardingAlgorithm::new(*sharding_count)?)
            }
            AlgorithmConfig::HashMod { sharding_count } => {
                Arc::new(HashModShardingAlgorithm::new(*sharding_count)?)
            }
            AlgorithmConfig::BoundaryRange { boundaries } => {
                Arc::new(BoundaryRangeShardingAlgorithm::new(boundaries.clone())?)
            }
            AlgorithmConfig::VolumeRange {
                lower,
                upper,
                volume,
            } => Arc::new(BoundaryRangeShardingAlgorithm::with_volume(*lower, *upper, *volume)?),
            AlgorithmConfig::Custom { name } => self
                .precise
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownAlgorithm(name.clone()))?,
        };
        Ok(algorithm)
    }

    /// 根据描述构建范围分片算法
    pub fn range_algorithm(
        &self,
        config: &AlgorithmConfig,
    ) -> ConfigResult<Arc<dyn RangeShardingAlgorithm>> {
        let algorithm: Arc<dyn RangeShardingAlgorithm> = match config {
            AlgorithmConfig::Mod { sharding_count } => {
                Arc::new(ModShardingAlgorithm::new(*sharding_count)?)
            }
            AlgorithmConfig::HashMod { .. } => {
                return Err(ConfigError::RangeNotSupported(HashModShardingAlgorithm::NAME.to_string()));
            }
            AlgorithmConfig::BoundaryRange { boundaries } => {
                Arc::new(BoundaryRangeShardingAlgorithm::new(boundaries.clone())?)
            }
            AlgorithmConfig::VolumeRange {
                lower,
                upper,
                volume,
            } => Arc::new(BoundaryRangeShardingAlgorithm::with_volume(*lower, *upper, *volume)?),
            AlgorithmConfig::Custom { name } => self
                .range
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownAlgorithm(name.clone()))?,
        };
        Ok(algorithm)
    }

    /// 根据描述构建分片策略
    pub fn build_strategy(&self, config: &ShardingStrategyConfig) -> ConfigResult<ShardingStrategy> {
        match config {
            ShardingStrategyConfig::Standard {
                sharding_column,
                precise_algorithm,
                range_algorithm,
            } => {
                let column = require_column(sharding_column)?;
                let precise = self.precise_algorithm(precise_algorithm)?;
                let range = match range_algorithm {
                    Some(range) => Some(self.range_algorithm(range)?),
                    None => None,
                };
                Ok(ShardingStrategy::Standard {
                    column,
                    precise,
                    range,
                })
            }
            ShardingStrategyConfig::Complex {
                sharding_columns,
                algorithm,
            } => {
                if sharding_columns.is_empty() {
                    return Err(ConfigError::EmptyShardingColumn);
                }
                let columns = sharding_columns
                    .iter()
                    .map(|c| require_column(c))
                    .collect::<ConfigResult<Vec<_>>>()?;
                let algorithm = self
                    .complex
                    .get(algorithm)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownAlgorithm(algorithm.clone()))?;
                Ok(ShardingStrategy::Complex { columns, algorithm })
            }
            ShardingStrategyConfig::Inline {
                sharding_column,
                algorithm_expression,
            } => {
                let column = require_column(sharding_column)?;
                let precise = Arc::new(InlineShardingAlgorithm::new(&column, algorithm_expression)?);
                Ok(ShardingStrategy::standard(column, precise))
            }
            ShardingStrategyConfig::None => Ok(ShardingStrategy::None),
        }
    }
}

fn require_column(column: &str) -> ConfigResult<String> {
    let column = column.trim();
    if column.is_empty() {
        return Err(ConfigError::EmptyShardingColumn);
    }
    Ok(column.to_string())
}
