//! 分片算法接口
//!
//! 算法只负责"从候选目标中选择"，候选目标由规则给出：
//! 数据库级策略的候选是逻辑表涉及的数据源，表级策略的候选是该数据源上的真实表。
//! 算法返回的目标若不在候选集合中，会被策略层丢弃。

use std::fmt;

use crate::core::error::RoutingResult;
use crate::core::value::{ShardingValue, ValueRange};
use crate::route::condition::ShardingPredicate;

/// 精确分片值
#[derive(Debug, Clone, Copy)]
pub struct PreciseShardingValue<'a> {
    pub logic_table: &'a str,
    pub column: &'a str,
    pub value: &'a ShardingValue,
}

/// 范围分片值
#[derive(Debug, Clone, Copy)]
pub struct RangeShardingValue<'a> {
    pub logic_table: &'a str,
    pub column: &'a str,
    pub range: &'a ValueRange,
}

/// 复合分片值，包含策略关注的所有分片列上出现的谓词
#[derive(Debug, Clone)]
pub struct ComplexShardingValue<'a> {
    pub logic_table: &'a str,
    pub predicates: Vec<(&'a str, &'a ShardingPredicate)>,
}

impl<'a> ComplexShardingValue<'a> {
    pub fn get(&self, column: &str) -> Option<&'a ShardingPredicate> {
        self.predicates
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, p)| *p)
    }
}

/// 精确分片算法，处理 `=` 与 `IN`
///
/// 必须是确定的：同一取值总是得到同一目标。返回 `Ok(None)` 表示没有匹配的目标。
pub trait PreciseShardingAlgorithm: Send + Sync + fmt::Debug {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> RoutingResult<Option<String>>;
}

/// 范围分片算法，处理区间谓词
///
/// 返回的集合不得遗漏任何可能包含区间内数据的目标，可以多但应尽量少。
pub trait RangeShardingAlgorithm: Send + Sync + fmt::Debug {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> RoutingResult<Vec<String>>;
}

/// 复合分片算法，一次性处理多个分片列
pub trait ComplexKeysShardingAlgorithm: Send + Sync + fmt::Debug {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ComplexShardingValue<'_>,
    ) -> RoutingResult<Vec<String>>;
}

/// 解析目标名称末尾的数字后缀，例如 `t_order_12` 返回 12
pub fn target_suffix(target: &str) -> Option<u64> {
    let digits = target.len() - target.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    target[target.len() - digits..].parse().ok()
}

/// 按数字后缀查找目标
pub fn find_target_by_suffix(available_targets: &[String], suffix: u64) -> Option<&String> {
    available_targets
        .iter()
        .find(|t| target_suffix(t) == Some(suffix))
}

/// 保留后缀满足条件的目标，保持候选顺序
pub fn filter_targets_by_suffix<F>(available_targets: &[String], mut keep: F) -> Vec<String>
where
    F: FnMut(u64) -> bool,
{
    available_targets
        .iter()
        .filter(|t| target_suffix(t).is_some_and(&mut keep))
        .cloned()
        .collect()
}
