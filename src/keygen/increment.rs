//! 自增主键生成器
//!
//! 基于原子计数器，种子为已有数据中的最大主键，生成值从 seed + 1 开始

use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::KeyGeneratorKind;
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::value::ShardingValue;
use crate::keygen::KeyGenerator;

/// 基于原子计数器的主键生成器
///
/// 线程安全，并发调用永远不会得到相同的值
#[derive(Debug)]
pub struct IncrementKeyGenerator {
    counter: AtomicI64,
}

impl IncrementKeyGenerator {
    /// 创建新的生成器，使用指定的种子
    pub fn new(seed: i64) -> Self {
        Self {
            counter: AtomicI64::new(seed),
        }
    }

    /// 生成下一个主键，计数器到达 `i64::MAX` 后返回耗尽错误
    pub fn next_id(&self) -> ConfigResult<i64> {
        self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| current.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| ConfigError::KeyGeneratorExhausted(KeyGeneratorKind::Increment.to_string()))
    }

    /// 获取最近一次生成的值（尚未生成时为种子）
    pub fn current_value(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for IncrementKeyGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl KeyGenerator for IncrementKeyGenerator {
    fn kind(&self) -> KeyGeneratorKind {
        KeyGeneratorKind::Increment
    }

    fn next_key(&self) -> ConfigResult<ShardingValue> {
        self.next_id().map(ShardingValue::Int)
    }
}
