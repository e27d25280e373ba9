//! Snowflake 主键生成器
//!
//! 主键从高位到低位依次为：1 位符号位（恒为 0）、41 位自 [`EPOCH_MILLIS`] 起的毫秒数、
//! 10 位工作节点号、12 位毫秒内序列号。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::KeyGeneratorKind;
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::value::ShardingValue;
use crate::keygen::KeyGenerator;

/// 起始时间 2016-11-01T00:00:00Z，单位毫秒
pub const EPOCH_MILLIS: i64 = 1_477_929_600_000;

pub const SEQUENCE_BITS: u32 = 12;
pub const WORKER_ID_BITS: u32 = 10;
pub const MAX_WORKER_ID: i64 = 1 << WORKER_ID_BITS;
pub const DEFAULT_MAX_TOLERATE_TIME_DIFFERENCE_MS: u64 = 10;

const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
const MAX_ELAPSED_MILLIS: u64 = (1 << 41) - 1;
const UNSET: u64 = u64::MAX;

/// 毫秒时钟，测试中可替换
pub trait TimeService: Send + Sync {
    fn current_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeService;

impl TimeService for SystemTimeService {
    fn current_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct SnowflakeKeyGenerator {
    worker_id: u64,
    max_tolerate_time_difference_ms: u64,
    /// 上一个主键的 `elapsed_millis << SEQUENCE_BITS | sequence`，尚未生成时为 `UNSET`
    ///
    /// 记录的毫秒数总是某次读到的时钟值，不会超前于时钟
    state: AtomicU64,
    time_service: Arc<dyn TimeService>,
}

impl fmt::Debug for SnowflakeKeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeKeyGenerator")
            .field("worker_id", &self.worker_id)
            .field("max_tolerate_time_difference_ms", &self.max_tolerate_time_difference_ms)
            .finish()
    }
}

impl SnowflakeKeyGenerator {
    pub fn new(worker_id: i64) -> ConfigResult<Self> {
        Self::with_time_service(
            worker_id,
            DEFAULT_MAX_TOLERATE_TIME_DIFFERENCE_MS,
            Arc::new(SystemTimeService),
        )
    }

    pub fn with_time_service(
        worker_id: i64,
        max_tolerate_time_difference_ms: u64,
        time_service: Arc<dyn TimeService>,
    ) -> ConfigResult<Self> {
        if !(0..MAX_WORKER_ID).contains(&worker_id) {
            return Err(ConfigError::key_generator_option(
                "snowflake",
                format!("worker_id {} out of range 0..{}", worker_id, MAX_WORKER_ID),
            ));
        }
        Ok(Self {
            worker_id: worker_id as u64,
            max_tolerate_time_difference_ms,
            state: AtomicU64::new(UNSET),
            time_service,
        })
    }

    pub fn worker_id(&self) -> i64 {
        self.worker_id as i64
    }

    fn elapsed_millis(&self) -> ConfigResult<u64> {
        let elapsed = self.time_service.current_millis() - EPOCH_MILLIS;
        if elapsed < 0 {
            return Err(ConfigError::ClockMovedBackwards(-elapsed));
        }
        Ok(elapsed as u64)
    }

    /// 时钟落后于 `last_millis` 超过容忍值时返回错误
    fn check_clock(&self, now: u64, last_millis: u64) -> ConfigResult<()> {
        let behind = last_millis.saturating_sub(now);
        if behind > self.max_tolerate_time_difference_ms {
            log::error!("时钟回拨 {} 毫秒，超过容忍值 {} 毫秒", behind, self.max_tolerate_time_difference_ms);
            return Err(ConfigError::ClockMovedBackwards(behind as i64));
        }
        Ok(())
    }

    /// 等待时钟越过 `last_millis`
    fn wait_until_after(&self, last_millis: u64) -> ConfigResult<()> {
        loop {
            let now = self.elapsed_millis()?;
            if now > last_millis {
                return Ok(());
            }
            self.check_clock(now, last_millis)?;
            thread::yield_now();
        }
    }

    pub fn next_id(&self) -> ConfigResult<i64> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let last_millis = current >> SEQUENCE_BITS;
            let last_sequence = current & SEQUENCE_MASK;
            let now = self.elapsed_millis()?;

            let (millis, sequence) = if current == UNSET || now > last_millis {
                (now, 0)
            } else {
                // 容忍范围内的回拨沿用上一个毫秒数
                self.check_clock(now, last_millis)?;
                if last_sequence == SEQUENCE_MASK {
                    // 当前毫秒的序列号用尽
                    self.wait_until_after(last_millis)?;
                    current = self.state.load(Ordering::Acquire);
                    continue;
                }
                (last_millis, last_sequence + 1)
            };
            if millis > MAX_ELAPSED_MILLIS {
                return Err(ConfigError::KeyGeneratorExhausted(
                    KeyGeneratorKind::Snowflake.to_string(),
                ));
            }

            let next = (millis << SEQUENCE_BITS) | sequence;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let id = (millis << TIMESTAMP_SHIFT)
                        | (self.worker_id << WORKER_ID_SHIFT)
                        | sequence;
                    return Ok(id as i64);
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl KeyGenerator for SnowflakeKeyGenerator {
    fn kind(&self) -> KeyGeneratorKind {
        KeyGeneratorKind::Snowflake
    }

    fn next_key(&self) -> ConfigResult<ShardingValue> {
        self.next_id().map(ShardingValue::Int)
    }
}

/// 拆分主键为 (自起始时间的毫秒数, 工作节点号, 序列号)
pub fn decompose(id: i64) -> (i64, i64, i64) {
    let id = id as u64;
    let millis = id >> TIMESTAMP_SHIFT;
    let worker_id = (id >> WORKER_ID_SHIFT) & ((1 << WORKER_ID_BITS) - 1);
    let sequence = id & SEQUENCE_MASK;
    (millis as i64, worker_id as i64, sequence as i64)
}
