//! 集成测试共享工具模块
//!
//! 提供测试基础设施和辅助函数，供所有集成测试使用

#![allow(dead_code)]

pub mod assertions;

use std::io::Write;

use shardrule::config::{
    AlgorithmConfig, KeyGeneratorConfig, ShardingRuleConfig, ShardingStrategyConfig, TableRuleConfig,
};
use shardrule::route::RouteResult;
use shardrule::rule::ShardingRule;
use tempfile::NamedTempFile;

/// 订单库的 TOML 配置：两个数据源，每个数据源两张订单表
pub const ORDER_CONFIG_TOML: &str = r#"
data_sources = ["ds0", "ds1"]
binding_table_groups = ["t_order, t_order_item"]
broadcast_tables = ["t_dict"]

[default_database_strategy]
type = "standard"
sharding_column = "user_id"
precise_algorithm = { type = "mod", sharding_count = 2 }
range_algorithm = { type = "mod", sharding_count = 2 }

[[tables]]
logic_table = "t_order"
actual_data_nodes = "ds${0..1}.t_order_${0..1}"

[tables.table_strategy]
type = "standard"
sharding_column = "order_id"
precise_algorithm = { type = "mod", sharding_count = 2 }
range_algorithm = { type = "mod", sharding_count = 2 }

[[tables.key_generators]]
column = "order_id"
type = "increment"
props = { seed = 1000 }

[[tables]]
logic_table = "t_order_item"
actual_data_nodes = "ds${0..1}.t_order_item_${0..1}"

[tables.table_strategy]
type = "inline"
sharding_column = "order_id"
algorithm_expression = "t_order_item_${order_id % 2}"

[log]
level = "debug"
"#;

/// 与 `ORDER_CONFIG_TOML` 等价的代码构建配置
pub fn order_rule_config() -> ShardingRuleConfig {
    ShardingRuleConfig::new()
        .with_data_sources(["ds0", "ds1"])
        .with_table(
            TableRuleConfig::new("t_order")
                .with_actual_data_nodes("ds${0..1}.t_order_${0..1}")
                .with_table_strategy(ShardingStrategyConfig::standard_with_range(
                    "order_id",
                    AlgorithmConfig::modulo(2),
                    AlgorithmConfig::modulo(2),
                ))
                .with_key_generator(KeyGeneratorConfig::increment("order_id").with_seed(1000)),
        )
        .with_table(
            TableRuleConfig::new("t_order_item")
                .with_actual_data_nodes("ds${0..1}.t_order_item_${0..1}")
                .with_table_strategy(ShardingStrategyConfig::inline(
                    "order_id",
                    "t_order_item_${order_id % 2}",
                )),
        )
        .with_binding_group("t_order, t_order_item")
        .with_broadcast_table("t_dict")
        .with_default_database_strategy(ShardingStrategyConfig::standard_with_range(
            "user_id",
            AlgorithmConfig::modulo(2),
            AlgorithmConfig::modulo(2),
        ))
}

pub fn order_rule() -> ShardingRule {
    ShardingRule::from_config(&order_rule_config()).expect("Failed to build order rule")
}

/// 路由结果中的数据节点，格式为 `ds.table`
pub fn nodes(result: &RouteResult) -> Vec<String> {
    result.data_nodes().map(|n| n.to_string()).collect()
}

/// 把配置写入临时文件，文件随返回值释放而删除
pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temporary file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config to temporary file");
    file
}
