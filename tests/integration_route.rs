//! 路由集成测试
//!
//! 测试范围:
//! - 精确、IN、范围条件的分库分表路由
//! - 缺少分片列时的广播与取值不匹配时的错误
//! - 广播表、默认数据源与未配置表
//! - 插入语句的主键补齐

mod common;

use common::assertions::{assert_err_with, assert_positions_sorted, assert_route_count};
use common::{nodes, order_rule, order_rule_config};

use shardrule::config::{AlgorithmConfig, ShardingRuleConfig, ShardingStrategyConfig, TableRuleConfig};
use shardrule::core::error::{RoutingError, ShardingError};
use shardrule::route::{RouteContext, ShardingConditions};
use shardrule::rule::ShardingRule;
use shardrule::{ShardingValue, ValueRange};

#[test]
fn test_precise_database_and_table_route() {
    let rule = order_rule();
    let result = rule
        .route(
            "t_order",
            &ShardingConditions::new().with_equal("user_id", 4).with_equal("order_id", 3),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds0.t_order_1"]);
    assert!(!result.broadcast);
}

#[test]
fn test_in_list_routes_union() {
    let rule = order_rule();
    let result = rule
        .route(
            "t_order",
            &ShardingConditions::new()
                .with_in("user_id", [1, 3])
                .with_in("order_id", [2, 4, 5]),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds1.t_order_0", "ds1.t_order_1"]);
    assert_positions_sorted(&result);
}

#[test]
fn test_no_predicates_broadcasts_every_node() {
    let result = order_rule()
        .route("t_order", &ShardingConditions::new())
        .expect("Failed to route");

    assert_route_count(&result, 4);
    assert!(result.broadcast);
    assert_positions_sorted(&result);
}

#[test]
fn test_case_variant_nodes_route_once() {
    let config = ShardingRuleConfig::new().with_data_sources(["ds0"]).with_table(
        TableRuleConfig::new("t_order").with_actual_data_nodes("ds0.t_order_0, ds0.T_ORDER_0, ds0.t_order_1"),
    );
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let result = rule
        .route("t_order", &ShardingConditions::new())
        .expect("Failed to route");
    assert_eq!(nodes(&result), vec!["ds0.t_order_0", "ds0.t_order_1"]);
    assert_eq!(result.positions(), vec![0, 1]);
    assert_positions_sorted(&result);
}

#[test]
fn test_column_names_are_case_insensitive() {
    let result = order_rule()
        .route(
            "T_ORDER",
            &ShardingConditions::new().with_equal("USER_ID", 5).with_equal("Order_Id", 6),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds1.t_order_0"]);
}

#[test]
fn test_range_route_narrows_tables() {
    let result = order_rule()
        .route(
            "t_order",
            &ShardingConditions::new()
                .with_equal("user_id", 2)
                .with_range("order_id", ValueRange::closed(7, 7)),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds0.t_order_1"]);
}

#[test]
fn test_unbounded_range_hits_all_tables() {
    let result = order_rule()
        .route(
            "t_order",
            &ShardingConditions::new()
                .with_equal("user_id", 2)
                .with_range("order_id", ValueRange::at_least(100)),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds0.t_order_0", "ds0.t_order_1"]);
}

#[test]
fn test_range_without_range_algorithm_falls_back_to_broadcast() {
    let result = order_rule()
        .route(
            "t_order_item",
            &ShardingConditions::new()
                .with_equal("user_id", 1)
                .with_range("order_id", ValueRange::closed(1, 2)),
        )
        .expect("Failed to route");

    assert_eq!(nodes(&result), vec!["ds1.t_order_item_0", "ds1.t_order_item_1"]);
}

#[test]
fn test_predicate_without_match_is_error() {
    let config = ShardingRuleConfig::new()
        .with_data_sources(["ds0", "ds1"])
        .with_table(
            TableRuleConfig::new("t_order")
                .with_actual_data_nodes("ds${0..1}.t_order")
                .with_database_strategy(ShardingStrategyConfig::standard(
                    "user_id",
                    AlgorithmConfig::modulo(3),
                )),
        );
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let result = rule.route("t_order", &ShardingConditions::new().with_equal("user_id", 2));
    assert!(matches!(result, Err(RoutingError::NoMatchingTarget { .. })));

    let broadcast = rule
        .route("t_order", &ShardingConditions::new())
        .expect("Failed to route");
    assert_route_count(&broadcast, 2);
}

#[test]
fn test_string_value_for_mod_is_unsupported() {
    let result = order_rule().route(
        "t_order",
        &ShardingConditions::new().with_equal("user_id", "alice"),
    );
    assert!(matches!(result, Err(RoutingError::UnsupportedValue { .. })));
}

#[test]
fn test_table_without_rule_is_error() {
    let result = order_rule().route("t_user", &ShardingConditions::new().with_equal("user_id", 1));
    assert_eq!(result, Err(RoutingError::TableRuleNotFound("t_user".to_string())));
    assert_err_with(result, "t_user");
}

#[test]
fn test_default_data_source_routes_unconfigured_table() {
    let config = order_rule_config().with_default_data_source("ds1");
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let result = rule
        .route("t_user", &ShardingConditions::new())
        .expect("Failed to route");
    assert_eq!(nodes(&result), vec!["ds1.t_user"]);
}

#[test]
fn test_broadcast_table_query_and_write() {
    let rule = order_rule();

    let query = rule
        .route("t_dict", &ShardingConditions::new())
        .expect("Failed to route query");
    assert_eq!(nodes(&query), vec!["ds0.t_dict"]);

    let write = rule
        .route_with_context("t_dict", &ShardingConditions::new(), &mut RouteContext::write())
        .expect("Failed to route write");
    assert_eq!(nodes(&write), vec!["ds0.t_dict", "ds1.t_dict"]);
}

#[test]
fn test_write_to_unsharded_multi_node_table_is_ambiguous() {
    let config = ShardingRuleConfig::new()
        .with_data_sources(["ds0", "ds1"])
        .with_table(TableRuleConfig::new("t_log"));
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let result = rule.route_with_context("t_log", &ShardingConditions::new(), &mut RouteContext::write());
    assert!(matches!(result, Err(RoutingError::AmbiguousRoute { node_count: 2, .. })));
}

#[test]
fn test_single_node_table_routes_directly() {
    let config = ShardingRuleConfig::new()
        .with_data_sources(["ds0", "ds1"])
        .with_table(TableRuleConfig::new("t_config").with_actual_data_nodes("ds1.t_config"));
    let rule = ShardingRule::from_config(&config).expect("Failed to build rule");

    let result = rule
        .route_with_context("t_config", &ShardingConditions::new(), &mut RouteContext::write())
        .expect("Failed to route");
    assert_eq!(nodes(&result), vec!["ds1.t_config"]);
}

#[test]
fn test_insert_generates_key_before_routing() {
    let rule = order_rule();
    let mut context = RouteContext::write();

    let insert = rule
        .route_insert("t_order", ShardingConditions::new().with_equal("user_id", 7), &mut context)
        .expect("Failed to route insert");

    assert_eq!(insert.generated_key, Some(ShardingValue::Int(1001)));
    assert_eq!(nodes(&insert.route), vec!["ds1.t_order_1"]);
}

#[test]
fn test_insert_without_key_generator_requires_shard_key() {
    let rule = order_rule();
    let result = rule.route_insert(
        "t_order_item",
        ShardingConditions::new().with_equal("user_id", 0),
        &mut RouteContext::write(),
    );

    assert!(matches!(
        result,
        Err(ShardingError::Routing(RoutingError::InsertMultipleNodes { node_count: 2, .. }))
    ));
}

#[test]
fn test_generated_keys_spread_over_tables() {
    let rule = order_rule();
    let mut tables = std::collections::HashSet::new();
    for _ in 0..4 {
        let insert = rule
            .route_insert(
                "t_order",
                ShardingConditions::new().with_equal("user_id", 0),
                &mut RouteContext::write(),
            )
            .expect("Failed to route insert");
        tables.insert(insert.route.units[0].table().to_string());
    }
    assert_eq!(tables.len(), 2);
}
