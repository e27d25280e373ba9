//! 区间条件
//!
//! 对应 SQL 中的 `BETWEEN`、`>`、`<=` 等谓词，两端可以是开区间、闭区间或无界

use std::ops::Bound;

use super::ShardingValue;

/// 分片键上的区间条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRange {
    lower: Bound<ShardingValue>,
    upper: Bound<ShardingValue>,
}

impl ValueRange {
    pub fn new(lower: Bound<ShardingValue>, upper: Bound<ShardingValue>) -> Self {
        Self { lower, upper }
    }

    /// `[lower, upper]`，对应 `BETWEEN lower AND upper`
    pub fn closed(lower: impl Into<ShardingValue>, upper: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Included(lower.into()), Bound::Included(upper.into()))
    }

    /// `(lower, upper)`
    pub fn open(lower: impl Into<ShardingValue>, upper: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Excluded(lower.into()), Bound::Excluded(upper.into()))
    }

    /// `>= lower`
    pub fn at_least(lower: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Included(lower.into()), Bound::Unbounded)
    }

    /// `> lower`
    pub fn greater_than(lower: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Excluded(lower.into()), Bound::Unbounded)
    }

    /// `<= upper`
    pub fn at_most(upper: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Unbounded, Bound::Included(upper.into()))
    }

    /// `< upper`
    pub fn less_than(upper: impl Into<ShardingValue>) -> Self {
        Self::new(Bound::Unbounded, Bound::Excluded(upper.into()))
    }

    /// 两端均无界
    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    pub fn lower(&self) -> Bound<&ShardingValue> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Bound<&ShardingValue> {
        self.upper.as_ref()
    }

    /// 判断取值是否落在区间内，类型不同的取值视为不在区间内
    pub fn contains(&self, value: &ShardingValue) -> bool {
        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(l) => matches!(value.compare(l), Some(o) if o.is_ge()),
            Bound::Excluded(l) => matches!(value.compare(l), Some(o) if o.is_gt()),
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(u) => matches!(value.compare(u), Some(o) if o.is_le()),
            Bound::Excluded(u) => matches!(value.compare(u), Some(o) if o.is_lt()),
        };
        above_lower && below_upper
    }

    /// 判断区间是否不可能包含任何取值
    pub fn is_empty(&self) -> bool {
        if let Some((lo, hi)) = self.to_closed_i64() {
            return lo > hi;
        }
        match (&self.lower, &self.upper) {
            (Bound::Included(l), Bound::Included(u)) => {
                matches!(l.compare(u), Some(o) if o.is_gt())
            }
            (Bound::Included(l), Bound::Excluded(u))
            | (Bound::Excluded(l), Bound::Included(u))
            | (Bound::Excluded(l), Bound::Excluded(u)) => {
                matches!(l.compare(u), Some(o) if o.is_ge())
            }
            _ => false,
        }
    }

    /// 将区间转换为闭合的整数区间 `[lo, hi]`
    ///
    /// 任一有界端不是整数时返回 `None`；无界端分别取 `i64::MIN` / `i64::MAX`；
    /// 空区间返回 `lo > hi` 的一对值。
    pub fn to_closed_i64(&self) -> Option<(i64, i64)> {
        let lo = match &self.lower {
            Bound::Unbounded => i64::MIN,
            Bound::Included(v) => v.as_i64()?,
            Bound::Excluded(v) => match v.as_i64()?.checked_add(1) {
                Some(n) => n,
                None => return Some((i64::MAX, i64::MIN)),
            },
        };
        let hi = match &self.upper {
            Bound::Unbounded => i64::MAX,
            Bound::Included(v) => v.as_i64()?,
            Bound::Excluded(v) => match v.as_i64()?.checked_sub(1) {
                Some(n) => n,
                None => return Some((i64::MAX, i64::MIN)),
            },
        };
        Some((lo, hi))
    }
}
