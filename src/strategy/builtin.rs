//! 内置分片算法
//!
//! 内置算法都按目标名称的数字后缀选择目标：
//! 选中分片编号为 `i` 时，返回候选集合中后缀等于 `i` 的目标。

use crate::core::error::{ConfigError, ConfigResult, RoutingError, RoutingResult};
use crate::core::murmur::hash_sharding_value;
use crate::core::value::ShardingValue;
use crate::strategy::algorithm::{
    filter_targets_by_suffix, find_target_by_suffix, PreciseShardingAlgorithm,
    PreciseShardingValue, RangeShardingAlgorithm, RangeShardingValue,
};

fn unsupported(algorithm: &str, value: &ShardingValue) -> RoutingError {
    RoutingError::UnsupportedValue {
        algorithm: algorithm.to_string(),
        value: value.to_string(),
    }
}

fn require_int(algorithm: &str, value: &ShardingValue) -> RoutingResult<i64> {
    value.as_i64().ok_or_else(|| unsupported(algorithm, value))
}

/// 取模分片：分片编号为 `value mod sharding_count`（非负余数）
#[derive(Debug, Clone)]
pub struct ModShardingAlgorithm {
    sharding_count: u64,
}

impl ModShardingAlgorithm {
    pub const NAME: &'static str = "mod";

    pub fn new(sharding_count: u64) -> ConfigResult<Self> {
        if sharding_count == 0 || sharding_count > i64::MAX as u64 {
            return Err(ConfigError::algorithm(Self::NAME, "sharding_count 必须为正数"));
        }
        Ok(Self { sharding_count })
    }

    pub fn sharding_count(&self) -> u64 {
        self.sharding_count
    }

    fn shard_of(&self, n: i64) -> u64 {
        n.rem_euclid(self.sharding_count as i64) as u64
    }
}

impl PreciseShardingAlgorithm for ModShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> RoutingResult<Option<String>> {
        let n = require_int(Self::NAME, value.value)?;
        Ok(find_target_by_suffix(available_targets, self.shard_of(n)).cloned())
    }
}

impl RangeShardingAlgorithm for ModShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> RoutingResult<Vec<String>> {
        let (lo, hi) = value.range.to_closed_i64().ok_or_else(|| RoutingError::UnsupportedValue {
            algorithm: Self::NAME.to_string(),
            value: format!("{:?}", value.range),
        })?;
        if lo > hi {
            return Ok(Vec::new());
        }
        // 区间宽度不小于分片数时，每个余数都会出现
        if (hi as i128 - lo as i128 + 1) >= self.sharding_count as i128 {
            return Ok(filter_targets_by_suffix(available_targets, |s| s < self.sharding_count));
        }
        // 余数从 lo 的余数开始连续递增 (hi - lo) 次，逐个检查候选目标的后缀是否落在其中
        let first = self.shard_of(lo) as i128;
        let width = hi as i128 - lo as i128;
        let count = self.sharding_count as i128;
        Ok(filter_targets_by_suffix(available_targets, |s| {
            s < self.sharding_count && (s as i128 - first).rem_euclid(count) <= width
        }))
    }
}

/// 哈希取模分片：分片编号为 `murmur2(value) mod sharding_count`
///
/// 哈希打散了取值顺序，因此不提供范围分片。
#[derive(Debug, Clone)]
pub struct HashModShardingAlgorithm {
    sharding_count: u64,
}

impl HashModShardingAlgorithm {
    pub const NAME: &'static str = "hash_mod";

    pub fn new(sharding_count: u64) -> ConfigResult<Self> {
        if sharding_count == 0 {
            return Err(ConfigError::algorithm(Self::NAME, "sharding_count 必须为正数"));
        }
        Ok(Self { sharding_count })
    }
}

impl PreciseShardingAlgorithm for HashModShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> RoutingResult<Option<String>> {
        let shard = hash_sharding_value(value.value) as u64 % self.sharding_count;
        Ok(find_target_by_suffix(available_targets, shard).cloned())
    }
}

/// 边界范围分片
///
/// 严格递增的边界 `[b0, b1, ..., bn]` 把整数空间切成 n+2 个连续分区：
/// 分区 0 为 `(-∞, b0)`，分区 i 为 `[b(i-1), bi)`，最后一个分区为 `[bn, +∞)`。
#[derive(Debug, Clone)]
pub struct BoundaryRangeShardingAlgorithm {
    boundaries: Vec<i64>,
}

impl BoundaryRangeShardingAlgorithm {
    pub const NAME: &'static str = "boundary_range";

    pub fn new(boundaries: Vec<i64>) -> ConfigResult<Self> {
        if boundaries.is_empty() {
            return Err(ConfigError::algorithm(Self::NAME, "boundaries 不能为空"));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::algorithm(Self::NAME, "boundaries 必须严格递增"));
        }
        Ok(Self { boundaries })
    }

    /// 按固定容量生成边界：`[lower, lower+volume, ..., upper]`
    pub fn with_volume(lower: i64, upper: i64, volume: i64) -> ConfigResult<Self> {
        const NAME: &str = "volume_range";
        if volume <= 0 {
            return Err(ConfigError::algorithm(NAME, "volume 必须为正数"));
        }
        if lower >= upper {
            return Err(ConfigError::algorithm(NAME, "lower 必须小于 upper"));
        }
        let mut boundaries = Vec::new();
        let mut current = lower;
        while current < upper {
            boundaries.push(current);
            current = match current.checked_add(volume) {
                Some(next) => next,
                None => break,
            };
        }
        boundaries.push(upper);
        Self::new(boundaries)
    }

    pub fn partition_count(&self) -> usize {
        self.boundaries.len() + 1
    }

    pub fn partition_of(&self, n: i64) -> u64 {
        self.boundaries.partition_point(|b| *b <= n) as u64
    }
}

impl PreciseShardingAlgorithm for BoundaryRangeShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> RoutingResult<Option<String>> {
        let n = require_int(Self::NAME, value.value)?;
        Ok(find_target_by_suffix(available_targets, self.partition_of(n)).cloned())
    }
}

impl RangeShardingAlgorithm for BoundaryRangeShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &RangeShardingValue<'_>,
    ) -> RoutingResult<Vec<String>> {
        let (lo, hi) = value.range.to_closed_i64().ok_or_else(|| RoutingError::UnsupportedValue {
            algorithm: Self::NAME.to_string(),
            value: format!("{:?}", value.range),
        })?;
        if lo > hi {
            return Ok(Vec::new());
        }
        let (first, last) = (self.partition_of(lo), self.partition_of(hi));
        Ok(filter_targets_by_suffix(available_targets, |s| (first..=last).contains(&s)))
    }
}
