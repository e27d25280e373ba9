//! 分片条件
//!
//! 由外部 SQL 解析器从语句中提取的分片键谓词。列名不区分大小写。

use std::collections::HashMap;

use crate::core::value::{ShardingValue, ValueRange};

/// 单个分片键上的谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardingPredicate {
    /// `col = v`（一个取值）或 `col IN (v1, v2, ...)`（多个取值）
    Equal(Vec<ShardingValue>),
    /// `col BETWEEN a AND b`、`col > a` 等区间谓词
    Range(ValueRange),
}

impl ShardingPredicate {
    pub fn equal(value: impl Into<ShardingValue>) -> Self {
        ShardingPredicate::Equal(vec![value.into()])
    }

    pub fn in_list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ShardingValue>,
    {
        ShardingPredicate::Equal(values.into_iter().map(Into::into).collect())
    }

    pub fn range(range: ValueRange) -> Self {
        ShardingPredicate::Range(range)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, ShardingPredicate::Range(_))
    }
}

/// 一条语句针对一张逻辑表的全部分片条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardingConditions {
    predicates: HashMap<String, ShardingPredicate>,
}

impl ShardingConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加等值条件
    pub fn with_equal(mut self, column: &str, value: impl Into<ShardingValue>) -> Self {
        self.insert(column, ShardingPredicate::equal(value));
        self
    }

    /// 添加 IN 条件
    pub fn with_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ShardingValue>,
    {
        self.insert(column, ShardingPredicate::in_list(values));
        self
    }

    /// 添加区间条件
    pub fn with_range(mut self, column: &str, range: ValueRange) -> Self {
        self.insert(column, ShardingPredicate::Range(range));
        self
    }

    /// 设置某列的谓词，返回被替换的旧谓词
    pub fn insert(&mut self, column: &str, predicate: ShardingPredicate) -> Option<ShardingPredicate> {
        self.predicates.insert(column.to_lowercase(), predicate)
    }

    pub fn get(&self, column: &str) -> Option<&ShardingPredicate> {
        self.predicates.get(&column.to_lowercase())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.predicates.contains_key(&column.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShardingPredicate)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_case_insensitive() {
        let conditions = ShardingConditions::new().with_equal("User_ID", 4);
        assert!(conditions.contains("user_id"));
        assert_eq!(
            conditions.get("USER_ID"),
            Some(&ShardingPredicate::Equal(vec![ShardingValue::Int(4)]))
        );
    }

    #[test]
    fn test_insert_replaces_predicate() {
        let mut conditions = ShardingConditions::new().with_in("order_id", [1, 2, 3]);
        let old = conditions.insert("order_id", ShardingPredicate::range(ValueRange::closed(1, 9)));
        assert!(matches!(old, Some(ShardingPredicate::Equal(ref v)) if v.len() == 3));
        assert!(conditions.get("order_id").is_some_and(ShardingPredicate::is_range));
        assert_eq!(conditions.len(), 1);
    }
}
