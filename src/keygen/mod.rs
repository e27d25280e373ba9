//! 主键生成器
//!
//! 规则为配置了生成器的逻辑表持有一个共享实例，插入语句缺少主键列时由它补齐。
//! 所有实现都可以被多个线程并发调用，且不会产生重复的值。

pub mod increment;
pub mod snowflake;
pub mod uuid;

pub use increment::IncrementKeyGenerator;
pub use snowflake::{SnowflakeKeyGenerator, SystemTimeService, TimeService};
pub use self::uuid::UuidKeyGenerator;

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::{KeyGeneratorConfig, KeyGeneratorKind};
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::value::ShardingValue;

/// 主键生成器
pub trait KeyGenerator: Send + Sync + Debug {
    fn kind(&self) -> KeyGeneratorKind;

    /// 生成下一个主键
    fn next_key(&self) -> ConfigResult<ShardingValue>;
}

/// 根据配置创建主键生成器
///
/// 不属于所选类型的参数会被拒绝，而不是静默忽略
pub fn create_key_generator(config: &KeyGeneratorConfig) -> ConfigResult<Arc<dyn KeyGenerator>> {
    let props = &config.props;
    let kind = config.kind.to_string();
    if config.column.trim().is_empty() {
        return Err(ConfigError::key_generator_option(&kind, "column must not be empty"));
    }

    let generator: Arc<dyn KeyGenerator> = match config.kind {
        KeyGeneratorKind::Increment => {
            if props.worker_id.is_some() || props.max_tolerate_time_difference_ms.is_some() {
                return Err(ConfigError::key_generator_option(
                    &kind,
                    "only 'seed' is supported",
                ));
            }
            Arc::new(IncrementKeyGenerator::new(props.seed.unwrap_or(0)))
        }
        KeyGeneratorKind::Snowflake => {
            if props.seed.is_some() {
                return Err(ConfigError::key_generator_option(
                    &kind,
                    "'seed' is not supported",
                ));
            }
            Arc::new(SnowflakeKeyGenerator::with_time_service(
                props.worker_id.unwrap_or(0),
                props
                    .max_tolerate_time_difference_ms
                    .unwrap_or(snowflake::DEFAULT_MAX_TOLERATE_TIME_DIFFERENCE_MS),
                Arc::new(SystemTimeService),
            )?)
        }
        KeyGeneratorKind::Uuid => {
            if *props != Default::default() {
                return Err(ConfigError::key_generator_option(&kind, "no options are supported"));
            }
            Arc::new(UuidKeyGenerator::new())
        }
    };
    log::debug!("创建主键生成器: 列 {}, 类型 {}", config.column, kind);
    Ok(generator)
}
