//! 主键生成器集成测试
//!
//! 测试范围:
//! - 并发生成不重复
//! - 规则级别的主键生成
//! - 生成器参数校验

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;

use shardrule::config::{KeyGeneratorConfig, KeyGeneratorKind, ShardingRuleConfig, TableRuleConfig};
use shardrule::core::error::ConfigError;
use shardrule::keygen::{create_key_generator, IncrementKeyGenerator, KeyGenerator, SnowflakeKeyGenerator};
use shardrule::rule::ShardingRule;
use shardrule::ShardingValue;

const CONCURRENT_CALLS: usize = 20_000;

fn assert_distinct(generator: Arc<dyn KeyGenerator>) {
    let keys: Vec<ShardingValue> = (0..CONCURRENT_CALLS)
        .into_par_iter()
        .map(|_| generator.next_key().expect("Failed to generate key"))
        .collect();
    let distinct: HashSet<&ShardingValue> = keys.iter().collect();
    assert_eq!(distinct.len(), CONCURRENT_CALLS, "{:?} 生成了重复的主键", generator.kind());
}

#[test]
fn test_concurrent_increment_keys_are_distinct() {
    let generator = Arc::new(IncrementKeyGenerator::new(0));
    assert_distinct(generator.clone());
    assert_eq!(generator.current_value(), CONCURRENT_CALLS as i64);
}

#[test]
fn test_concurrent_snowflake_keys_are_distinct() {
    let generator = SnowflakeKeyGenerator::new(1).expect("Failed to create snowflake generator");
    assert_distinct(Arc::new(generator));
}

#[test]
fn test_concurrent_uuid_keys_are_distinct() {
    let generator = create_key_generator(&KeyGeneratorConfig::new(KeyGeneratorKind::Uuid, "id"))
        .expect("Failed to create uuid generator");
    assert_distinct(generator);
}

#[test]
fn test_rule_generate_key_concurrently() {
    let config = ShardingRuleConfig::new().with_data_sources(["ds0"]).with_table(
        TableRuleConfig::new("t_order").with_key_generator(KeyGeneratorConfig::increment("order_id").with_seed(500)),
    );
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let keys: HashSet<i64> = (0..1000)
        .into_par_iter()
        .map(|_| {
            rule.generate_key("t_order")
                .expect("Failed to generate key")
                .as_i64()
                .expect("Increment keys should be integers")
        })
        .collect();
    assert_eq!(keys.len(), 1000);
    assert_eq!(keys.iter().min(), Some(&501));
    assert_eq!(keys.iter().max(), Some(&1500));
}

#[test]
fn test_generate_key_without_generator() {
    let config = ShardingRuleConfig::new()
        .with_data_sources(["ds0"])
        .with_table(TableRuleConfig::new("t_order"));
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    assert_eq!(
        rule.generate_key("t_order"),
        Err(ConfigError::KeyGeneratorNotFound("t_order".to_string()))
    );
    assert_eq!(
        rule.generate_key("t_missing"),
        Err(ConfigError::KeyGeneratorNotFound("t_missing".to_string()))
    );
}

#[test]
fn test_exhausted_generator_surfaces_on_use() {
    let config = ShardingRuleConfig::new().with_data_sources(["ds0"]).with_table(
        TableRuleConfig::new("t_order").with_key_generator(KeyGeneratorConfig::increment("order_id").with_seed(i64::MAX)),
    );
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    assert!(matches!(
        rule.generate_key("t_order"),
        Err(ConfigError::KeyGeneratorExhausted(_))
    ));
}

#[test]
fn test_invalid_generator_options_fail_construction() {
    let config = ShardingRuleConfig::new().with_data_sources(["ds0"]).with_table(
        TableRuleConfig::new("t_order")
            .with_key_generator(KeyGeneratorConfig::new(KeyGeneratorKind::Snowflake, "order_id").with_worker_id(4096)),
    );
    assert!(matches!(
        ShardingRule::from_config(&config),
        Err(ConfigError::InvalidKeyGeneratorOption { .. })
    ));
}
