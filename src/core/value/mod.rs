//! Value 模块 - 分片键取值类型
//!
//! - 分片键取值 (`ShardingValue`)
//! - 区间条件 (`range.rs`)

pub mod range;

pub use range::ValueRange;

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// 分片键取值，来自执行流程或主键生成器
///
/// 同类型取值全序，整数排在字符串之前
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShardingValue {
    Int(i64),
    Str(String),
}

impl ShardingValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ShardingValue::Int(n) => Some(*n),
            ShardingValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ShardingValue::Int(_) => None,
            ShardingValue::Str(s) => Some(s),
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, ShardingValue::Int(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ShardingValue::Int(_) => "int",
            ShardingValue::Str(_) => "string",
        }
    }

    /// 比较两个同类型取值，类型不同时返回 `None`
    pub fn compare(&self, other: &ShardingValue) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (ShardingValue::Int(a), ShardingValue::Int(b)) => Some(a.cmp(b)),
            (ShardingValue::Str(a), ShardingValue::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for ShardingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingValue::Int(n) => write!(f, "{}", n),
            ShardingValue::Str(s) => write!(f, "'{}'", s),
        }
    }
}

/// 能解析为整数时按整数处理，否则按字符串处理
///
/// 被单引号或双引号包围的字面量总是按字符串处理
impl FromStr for ShardingValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for quote in ['\'', '"'] {
            if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
                return Ok(ShardingValue::Str(trimmed[1..trimmed.len() - 1].to_string()));
            }
        }
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => ShardingValue::Int(n),
            Err(_) => ShardingValue::Str(trimmed.to_string()),
        })
    }
}

impl From<i64> for ShardingValue {
    fn from(n: i64) -> Self {
        ShardingValue::Int(n)
    }
}

impl From<i32> for ShardingValue {
    fn from(n: i32) -> Self {
        ShardingValue::Int(n as i64)
    }
}

impl From<u32> for ShardingValue {
    fn from(n: u32) -> Self {
        ShardingValue::Int(n as i64)
    }
}

impl From<&str> for ShardingValue {
    fn from(s: &str) -> Self {
        ShardingValue::Str(s.to_string())
    }
}

impl From<String> for ShardingValue {
    fn from(s: String) -> Self {
        ShardingValue::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!("42".parse::<ShardingValue>(), Ok(ShardingValue::Int(42)));
        assert_eq!(" -7 ".parse::<ShardingValue>(), Ok(ShardingValue::Int(-7)));
        assert_eq!("abc".parse::<ShardingValue>(), Ok(ShardingValue::from("abc")));
        assert_eq!("'42'".parse::<ShardingValue>(), Ok(ShardingValue::from("42")));
    }

    #[test]
    fn test_compare_same_kind_only() {
        let a = ShardingValue::Int(1);
        let b = ShardingValue::Int(2);
        assert_eq!(a.compare(&b), Some(std::cmp::Ordering::Less));
        assert_eq!(a.compare(&ShardingValue::from("1")), None);
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<ShardingValue> =
            serde_json::from_str(r#"[1, "a"]"#).expect("Failed to deserialize values");
        assert_eq!(values, vec![ShardingValue::Int(1), ShardingValue::from("a")]);
    }
}
