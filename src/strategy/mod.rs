//! 分片策略
//!
//! 策略把分片条件映射为候选目标的子集。两条路径严格区分：
//! - 语句中没有出现分片列：广播到全部候选目标
//! - 出现了分片列但没有任何目标匹配：路由错误
//!
//! 区间条件在没有配置范围算法时同样广播，并输出 warn 日志。

pub mod algorithm;
pub mod builtin;
pub mod inline;
pub mod registry;

pub use algorithm::{
    ComplexKeysShardingAlgorithm, ComplexShardingValue, PreciseShardingAlgorithm,
    PreciseShardingValue, RangeShardingAlgorithm, RangeShardingValue,
};
pub use builtin::{BoundaryRangeShardingAlgorithm, HashModShardingAlgorithm, ModShardingAlgorithm};
pub use inline::InlineShardingAlgorithm;
pub use registry::AlgorithmRegistry;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{RoutingError, RoutingResult};
use crate::route::condition::{ShardingConditions, ShardingPredicate};

/// 分片策略
#[derive(Clone)]
pub enum ShardingStrategy {
    /// 单分片列：精确算法 + 可选范围算法
    Standard {
        column: String,
        precise: Arc<dyn PreciseShardingAlgorithm>,
        range: Option<Arc<dyn RangeShardingAlgorithm>>,
    },
    /// 多分片列
    Complex {
        columns: Vec<String>,
        algorithm: Arc<dyn ComplexKeysShardingAlgorithm>,
    },
    /// 不分片
    None,
}

impl fmt::Debug for ShardingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingStrategy::Standard {
                column,
                precise,
                range,
            } => f
                .debug_struct("Standard")
                .field("column", column)
                .field("precise", precise)
                .field("range", range)
                .finish(),
            ShardingStrategy::Complex { columns, algorithm } => f
                .debug_struct("Complex")
                .field("columns", columns)
                .field("algorithm", algorithm)
                .finish(),
            ShardingStrategy::None => f.write_str("None"),
        }
    }
}

/// 策略求值结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardingOutcome {
    /// 选中的目标，保持候选集合中的顺序
    pub targets: Vec<String>,
    /// 是否因为没有可用的分片条件而广播
    pub broadcast: bool,
}

impl ShardingOutcome {
    fn broadcast(available_targets: &[String]) -> Self {
        Self {
            targets: available_targets.to_vec(),
            broadcast: true,
        }
    }

    fn selected(available_targets: &[String], selected: &HashSet<String>) -> Self {
        Self {
            targets: available_targets
                .iter()
                .filter(|t| selected.contains(*t))
                .cloned()
                .collect(),
            broadcast: false,
        }
    }
}

impl ShardingStrategy {
    pub fn standard(column: impl Into<String>, precise: Arc<dyn PreciseShardingAlgorithm>) -> Self {
        ShardingStrategy::Standard {
            column: column.into(),
            precise,
            range: None,
        }
    }

    pub fn standard_with_range(
        column: impl Into<String>,
        precise: Arc<dyn PreciseShardingAlgorithm>,
        range: Arc<dyn RangeShardingAlgorithm>,
    ) -> Self {
        ShardingStrategy::Standard {
            column: column.into(),
            precise,
            range: Some(range),
        }
    }

    /// 策略关注的分片列
    pub fn sharding_columns(&self) -> &[String] {
        match self {
            ShardingStrategy::Standard { column, .. } => std::slice::from_ref(column),
            ShardingStrategy::Complex { columns, .. } => columns,
            ShardingStrategy::None => &[],
        }
    }

    /// 是否真正参与分片
    pub fn is_sharding(&self) -> bool {
        !matches!(self, ShardingStrategy::None)
    }

    /// 根据分片条件从候选目标中选择
    pub fn resolve(
        &self,
        logic_table: &str,
        available_targets: &[String],
        conditions: &ShardingConditions,
    ) -> RoutingResult<ShardingOutcome> {
        match self {
            ShardingStrategy::None => Ok(ShardingOutcome::broadcast(available_targets)),
            ShardingStrategy::Standard {
                column,
                precise,
                range,
            } => match conditions.get(column) {
                None => {
                    log::debug!("逻辑表 {} 未提供分片列 {}，广播到 {:?}", logic_table, column, available_targets);
                    Ok(ShardingOutcome::broadcast(available_targets))
                }
                Some(ShardingPredicate::Equal(values)) => {
                    resolve_precise(logic_table, column, precise.as_ref(), available_targets, values)
                }
                Some(ShardingPredicate::Range(value_range)) => match range {
                    Some(range_algorithm) => {
                        let value = RangeShardingValue {
                            logic_table,
                            column,
                            range: value_range,
                        };
                        let selected: HashSet<String> = range_algorithm
                            .do_sharding(available_targets, &value)?
                            .into_iter()
                            .collect();
                        let outcome = ShardingOutcome::selected(available_targets, &selected);
                        if outcome.targets.is_empty() {
                            return Err(RoutingError::EmptyRangeResult {
                                logic_table: logic_table.to_string(),
                                column: column.clone(),
                            });
                        }
                        Ok(outcome)
                    }
                    None => {
                        log::warn!(
                            "逻辑表 {} 的分片列 {} 未配置范围算法，区间条件广播到全部 {} 个目标",
                            logic_table,
                            column,
                            available_targets.len()
                        );
                        Ok(ShardingOutcome::broadcast(available_targets))
                    }
                },
            },
            ShardingStrategy::Complex { columns, algorithm } => {
                let predicates: Vec<(&str, &ShardingPredicate)> = columns
                    .iter()
                    .filter_map(|c| conditions.get(c).map(|p| (c.as_str(), p)))
                    .collect();
                if predicates.is_empty() {
                    log::debug!("逻辑表 {} 未提供复合分片列 {:?}，广播", logic_table, columns);
                    return Ok(ShardingOutcome::broadcast(available_targets));
                }
                let value = ComplexShardingValue {
                    logic_table,
                    predicates,
                };
                let selected: HashSet<String> = algorithm
                    .do_sharding(available_targets, &value)?
                    .into_iter()
                    .collect();
                let outcome = ShardingOutcome::selected(available_targets, &selected);
                if outcome.targets.is_empty() {
                    return Err(RoutingError::EmptyComplexResult {
                        logic_table: logic_table.to_string(),
                        columns: columns.clone(),
                    });
                }
                Ok(outcome)
            }
        }
    }
}

fn resolve_precise(
    logic_table: &str,
    column: &str,
    algorithm: &dyn PreciseShardingAlgorithm,
    available_targets: &[String],
    values: &[crate::core::value::ShardingValue],
) -> RoutingResult<ShardingOutcome> {
    if values.is_empty() {
        return Err(RoutingError::EmptyPredicate {
            logic_table: logic_table.to_string(),
            column: column.to_string(),
        });
    }
    let mut selected = HashSet::new();
    for value in values {
        let precise = PreciseShardingValue {
            logic_table,
            column,
            value,
        };
        match algorithm.do_sharding(available_targets, &precise)? {
            Some(target) if available_targets.contains(&target) => {
                selected.insert(target);
            }
            _ => {
                return Err(RoutingError::NoMatchingTarget {
                    logic_table: logic_table.to_string(),
                    column: column.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(ShardingOutcome::selected(available_targets, &selected))
}
